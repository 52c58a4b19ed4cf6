//! Ciclo de vida do caso como máquina de estados explícita.
//!
//! O status deixa de ser um dropdown livre: cada estágio carrega apenas os
//! campos válidos naquele estado e toda mudança passa por
//! [`aplicar_transicao`], que valida a aresta antes de carimbar a linha.
//! Um `contrato_fechado` sem data de contrato é irrepresentável.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::caso::{Caso, StatusCaso};

/// Formato da numeração interna de casos (cruzamento com o sistema externo)
static RE_NUMERO_HON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^HON-\d{4}/\d{4}$").expect("regex de numeração HON válida"));

#[derive(Debug, Error)]
pub enum ErroLifecycle {
    #[error("transição de status não permitida: {de} -> {para}")]
    TransicaoNaoPermitida { de: StatusCaso, para: StatusCaso },

    #[error("campo inválido: {campo} - {motivo}")]
    CampoInvalido { campo: &'static str, motivo: String },
}

/// Honorários informados em uma proposta ou contrato, em BRL
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValoresHonorarios {
    #[serde(default)]
    pub pro_labore: f64,
    #[serde(default)]
    pub fixo_mensal: f64,
    #[serde(default)]
    pub exito_total: f64,
}

/// Estágio de destino de uma transição, com os dados que só existem nele
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Estagio {
    SobAnalise,
    PropostaEnviada {
        data_proposta: DateTime<Utc>,
        #[serde(default)]
        honorarios: ValoresHonorarios,
    },
    ContratoFechado {
        data_contrato: DateTime<Utc>,
        #[serde(default)]
        honorarios: ValoresHonorarios,
        #[serde(default)]
        assinado: Option<bool>,
    },
    Rejeitada {
        data_rejeicao: DateTime<Utc>,
        #[serde(default)]
        motivo: Option<String>,
    },
    Probono,
}

impl Estagio {
    pub fn status(&self) -> StatusCaso {
        match self {
            Estagio::SobAnalise => StatusCaso::SobAnalise,
            Estagio::PropostaEnviada { .. } => StatusCaso::PropostaEnviada,
            Estagio::ContratoFechado { .. } => StatusCaso::ContratoFechado,
            Estagio::Rejeitada { .. } => StatusCaso::Rejeitada,
            Estagio::Probono => StatusCaso::Probono,
        }
    }
}

/// Arestas válidas do ciclo de vida. Estados finais (contrato fechado,
/// rejeitada, probono) não admitem saída.
pub fn transicao_permitida(de: StatusCaso, para: StatusCaso) -> bool {
    use StatusCaso::*;
    matches!(
        (de, para),
        (SobAnalise, PropostaEnviada)
            | (SobAnalise, Rejeitada)
            | (SobAnalise, Probono)
            | (PropostaEnviada, ContratoFechado)
            | (PropostaEnviada, Rejeitada)
    )
}

/// Valida a aresta e carimba os campos do estágio na linha plana.
///
/// Campos históricos nunca são apagados: rejeitar um caso em negociação
/// mantém `data_proposta` e os honorários propostos — é isso que separa
/// perda em análise de perda em negociação no funil.
pub fn aplicar_transicao(caso: &mut Caso, estagio: Estagio) -> Result<(), ErroLifecycle> {
    let de = caso.status;
    let para = estagio.status();

    if !transicao_permitida(de, para) {
        return Err(ErroLifecycle::TransicaoNaoPermitida { de, para });
    }

    match estagio {
        Estagio::SobAnalise => {
            // Nenhuma aresta leva de volta a sob_analise; inalcançável após
            // a validação acima, mantido pelo exaustivo do match.
            caso.status = StatusCaso::SobAnalise;
        }
        Estagio::PropostaEnviada { data_proposta, honorarios } => {
            caso.status = StatusCaso::PropostaEnviada;
            caso.data_proposta = Some(data_proposta);
            caso.proposta_pro_labore = honorarios.pro_labore;
            caso.proposta_fixo_mensal = honorarios.fixo_mensal;
            caso.proposta_exito_total = honorarios.exito_total;
        }
        Estagio::ContratoFechado { data_contrato, honorarios, assinado } => {
            caso.status = StatusCaso::ContratoFechado;
            caso.data_contrato = Some(data_contrato);
            caso.contrato_pro_labore = honorarios.pro_labore;
            caso.contrato_fixo_mensal = honorarios.fixo_mensal;
            caso.contrato_exito_total = honorarios.exito_total;
            caso.contrato_assinado = assinado;
        }
        Estagio::Rejeitada { data_rejeicao, motivo } => {
            caso.status = StatusCaso::Rejeitada;
            caso.data_rejeicao = Some(data_rejeicao);
            caso.motivo_rejeicao = motivo;
        }
        Estagio::Probono => {
            caso.status = StatusCaso::Probono;
        }
    }

    Ok(())
}

/// Entrada canônica de caso (POST /casos). Único caminho de criação e de
/// validação de formulário reconhecido pelo serviço.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NovoCaso {
    pub numero_hon: String,
    pub nome_cliente: String,
    #[serde(default)]
    pub data_prospect: Option<DateTime<Utc>>,
    #[serde(default)]
    pub observacoes: Option<String>,
}

impl NovoCaso {
    pub fn validar(&self) -> Result<(), ErroLifecycle> {
        if self.nome_cliente.trim().is_empty() {
            return Err(ErroLifecycle::CampoInvalido {
                campo: "nome_cliente",
                motivo: "não pode ser vazio".to_string(),
            });
        }
        if !RE_NUMERO_HON.is_match(self.numero_hon.trim()) {
            return Err(ErroLifecycle::CampoInvalido {
                campo: "numero_hon",
                motivo: format!(
                    "'{}' não segue o formato HON-NNNN/AAAA",
                    self.numero_hon
                ),
            });
        }
        Ok(())
    }

    /// Materializa a linha inicial do caso, já validada, em sob_analise.
    pub fn em_registro(&self, agora: DateTime<Utc>) -> Result<Caso, ErroLifecycle> {
        self.validar()?;
        Ok(Caso {
            id: Uuid::new_v4(),
            numero_hon: self.numero_hon.trim().to_string(),
            nome_cliente: self.nome_cliente.trim().to_string(),
            status: StatusCaso::SobAnalise,
            criado_em: agora,
            data_prospect: self.data_prospect,
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
            observacoes: self.observacoes.clone(),
        })
    }
}
