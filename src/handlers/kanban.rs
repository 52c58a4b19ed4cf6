use axum::{extract::State, response::Json};
use serde::Serialize;
use std::sync::Arc;

use crate::models::{Caso, StatusCaso};
use crate::utils::AppError;
use crate::AppState;

/// Colunas fixas do quadro, na ordem do ciclo de vida
const COLUNAS: [(StatusCaso, &str); 5] = [
    (StatusCaso::SobAnalise, "Sob Análise"),
    (StatusCaso::PropostaEnviada, "Proposta Enviada"),
    (StatusCaso::ContratoFechado, "Contrato Fechado"),
    (StatusCaso::Rejeitada, "Rejeitada"),
    (StatusCaso::Probono, "Probono"),
];

#[derive(Debug, Serialize)]
pub struct ColunaKanban {
    pub status: StatusCaso,
    pub titulo: &'static str,
    pub casos: Vec<Caso>,
}

/// Agrupa os casos nas cinco colunas do quadro. Colunas vazias aparecem
/// com lista vazia; status desconhecidos não ganham coluna.
pub fn montar_quadro(casos: Vec<Caso>) -> Vec<ColunaKanban> {
    let mut quadro: Vec<ColunaKanban> = COLUNAS
        .iter()
        .map(|&(status, titulo)| ColunaKanban {
            status,
            titulo,
            casos: Vec::new(),
        })
        .collect();

    for caso in casos {
        if let Some(coluna) = quadro.iter_mut().find(|c| c.status == caso.status) {
            coluna.casos.push(caso);
        }
    }

    // Mais recentes no topo de cada coluna
    for coluna in &mut quadro {
        coluna.casos.sort_by(|a, b| b.criado_em.cmp(&a.criado_em));
    }

    quadro
}

/// GET /casos/kanban
pub async fn quadro_kanban(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ColunaKanban>>, AppError> {
    let casos = state.casos.listar(None).await?;
    Ok(Json(montar_quadro(casos)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn caso(status: StatusCaso, dia: u32) -> Caso {
        Caso {
            id: Uuid::new_v4(),
            numero_hon: "HON-0001/2026".to_string(),
            nome_cliente: "Cliente".to_string(),
            status,
            criado_em: Utc.with_ymd_and_hms(2026, 7, dia, 9, 0, 0).unwrap(),
            data_prospect: None,
            data_proposta: None,
            data_contrato: None,
            data_rejeicao: None,
            proposta_pro_labore: 0.0,
            proposta_fixo_mensal: 0.0,
            proposta_exito_total: 0.0,
            contrato_pro_labore: 0.0,
            contrato_fixo_mensal: 0.0,
            contrato_exito_total: 0.0,
            contrato_assinado: None,
            motivo_rejeicao: None,
            observacoes: None,
        }
    }

    #[test]
    fn test_quadro_tem_as_cinco_colunas_na_ordem() {
        let quadro = montar_quadro(vec![]);
        let ordem: Vec<StatusCaso> = quadro.iter().map(|c| c.status).collect();
        assert_eq!(
            ordem,
            vec![
                StatusCaso::SobAnalise,
                StatusCaso::PropostaEnviada,
                StatusCaso::ContratoFechado,
                StatusCaso::Rejeitada,
                StatusCaso::Probono,
            ]
        );
        assert!(quadro.iter().all(|c| c.casos.is_empty()));
    }

    #[test]
    fn test_casos_caem_na_coluna_do_status() {
        let quadro = montar_quadro(vec![
            caso(StatusCaso::SobAnalise, 1),
            caso(StatusCaso::ContratoFechado, 2),
            caso(StatusCaso::SobAnalise, 3),
        ]);

        assert_eq!(quadro[0].casos.len(), 2);
        assert_eq!(quadro[2].casos.len(), 1);
        assert_eq!(quadro[1].casos.len(), 0);
    }

    #[test]
    fn test_coluna_ordena_mais_recentes_primeiro() {
        let quadro = montar_quadro(vec![
            caso(StatusCaso::SobAnalise, 5),
            caso(StatusCaso::SobAnalise, 20),
            caso(StatusCaso::SobAnalise, 12),
        ]);

        let dias: Vec<u32> = quadro[0]
            .casos
            .iter()
            .map(|c| chrono::Datelike::day(&c.criado_em))
            .collect();
        assert_eq!(dias, vec![20, 12, 5]);
    }

    #[test]
    fn test_status_desconhecido_nao_ganha_coluna() {
        let quadro = montar_quadro(vec![caso(StatusCaso::Desconhecido, 1)]);
        let total: usize = quadro.iter().map(|c| c.casos.len()).sum();
        assert_eq!(total, 0);
    }
}
