use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Estágio atual do caso no ciclo de vida da controladoria
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCaso {
    SobAnalise,
    PropostaEnviada,
    ContratoFechado,
    Rejeitada,
    Probono,
    /// Valor que o backend enviou e esta versão não reconhece.
    /// Entra na contagem total do funil, mas em nenhum balde por status.
    #[serde(other)]
    Desconhecido,
}

impl Default for StatusCaso {
    fn default() -> Self {
        StatusCaso::Desconhecido
    }
}

impl fmt::Display for StatusCaso {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nome = match self {
            StatusCaso::SobAnalise => "sob_analise",
            StatusCaso::PropostaEnviada => "proposta_enviada",
            StatusCaso::ContratoFechado => "contrato_fechado",
            StatusCaso::Rejeitada => "rejeitada",
            StatusCaso::Probono => "probono",
            StatusCaso::Desconhecido => "desconhecido",
        };
        write!(f, "{}", nome)
    }
}

/// Registro de caso/contrato como persistido na tabela `casos` do backend.
///
/// Campos de data e valores monetários chegam do backend em formatos
/// variados (número, string numérica, string de data, null). O parse é
/// tolerante: valor inválido vira zero/ausente, nunca erro — o agregador
/// de métricas é função total sobre qualquer linha bem-tipada.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Caso {
    pub id: Uuid,
    #[serde(default)]
    pub numero_hon: String,
    #[serde(default)]
    pub nome_cliente: String,
    #[serde(default)]
    pub status: StatusCaso,
    pub criado_em: DateTime<Utc>,

    // Datas de estágio, cada uma marcada apenas quando o caso alcança o
    // estágio correspondente. Permanecem preenchidas após transições
    // posteriores (um caso rejeitado em negociação mantém data_proposta).
    #[serde(default, deserialize_with = "data_flexivel")]
    pub data_prospect: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "data_flexivel")]
    pub data_proposta: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "data_flexivel")]
    pub data_contrato: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "data_flexivel")]
    pub data_rejeicao: Option<DateTime<Utc>>,

    // Honorários por estágio, em BRL
    #[serde(default, deserialize_with = "valor_flexivel")]
    pub proposta_pro_labore: f64,
    #[serde(default, deserialize_with = "valor_flexivel")]
    pub proposta_fixo_mensal: f64,
    #[serde(default, deserialize_with = "valor_flexivel")]
    pub proposta_exito_total: f64,
    #[serde(default, deserialize_with = "valor_flexivel")]
    pub contrato_pro_labore: f64,
    #[serde(default, deserialize_with = "valor_flexivel")]
    pub contrato_fixo_mensal: f64,
    #[serde(default, deserialize_with = "valor_flexivel")]
    pub contrato_exito_total: f64,

    /// Tri-estado: só tem significado quando status = contrato_fechado
    #[serde(default)]
    pub contrato_assinado: Option<bool>,

    #[serde(default)]
    pub motivo_rejeicao: Option<String>,
    #[serde(default)]
    pub observacoes: Option<String>,
}

impl Caso {
    /// Data de referência do estágio de prospect: `data_prospect` quando
    /// marcada, senão a entrada do caso no sistema.
    pub fn data_referencia_prospect(&self) -> DateTime<Utc> {
        self.data_prospect.unwrap_or(self.criado_em)
    }

    /// O caso alcançou o estágio de proposta em algum momento,
    /// independentemente do desfecho final.
    pub fn alcancou_proposta(&self) -> bool {
        match self.status {
            StatusCaso::PropostaEnviada | StatusCaso::ContratoFechado => true,
            StatusCaso::Rejeitada => self.data_proposta.is_some(),
            _ => false,
        }
    }
}

/// Atualização parcial de campos editáveis (PUT /casos/{id})
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AtualizacaoCaso {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nome_cliente: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numero_hon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observacoes: Option<String>,
}

impl AtualizacaoCaso {
    pub fn vazia(&self) -> bool {
        self.nome_cliente.is_none() && self.numero_hon.is_none() && self.observacoes.is_none()
    }
}

/// Aceita número, string numérica (com vírgula decimal ou ponto) ou null.
/// Qualquer outra coisa vira 0.0.
fn valor_flexivel<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let valor = Option::<Value>::deserialize(deserializer)?;
    Ok(match valor {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().replace(',', ".").parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

/// Aceita timestamp RFC 3339 ou data simples `YYYY-MM-DD` (colunas `date`
/// do backend). String inválida ou tipo inesperado viram ausência.
fn data_flexivel<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let valor = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::String(s)) = valor else {
        return Ok(None);
    };
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    if let Ok(data) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(data.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decodificar(v: Value) -> Caso {
        serde_json::from_value(v).expect("linha bem-tipada nunca falha")
    }

    fn linha_minima() -> Value {
        json!({
            "id": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
            "criado_em": "2026-08-01T12:00:00Z"
        })
    }

    #[test]
    fn test_decodifica_linha_minima_com_padroes() {
        let caso = decodificar(linha_minima());
        assert_eq!(caso.status, StatusCaso::Desconhecido);
        assert_eq!(caso.proposta_pro_labore, 0.0);
        assert_eq!(caso.contrato_exito_total, 0.0);
        assert!(caso.data_proposta.is_none());
        assert!(caso.contrato_assinado.is_none());
    }

    #[test]
    fn test_status_desconhecido_nao_falha() {
        let mut linha = linha_minima();
        linha["status"] = json!("em_revisao_especial");
        let caso = decodificar(linha);
        assert_eq!(caso.status, StatusCaso::Desconhecido);
    }

    #[test]
    fn test_valor_aceita_string_com_virgula() {
        let mut linha = linha_minima();
        linha["contrato_pro_labore"] = json!("1500,50");
        linha["contrato_fixo_mensal"] = json!("2000.00");
        linha["proposta_exito_total"] = json!(300);
        let caso = decodificar(linha);
        assert_eq!(caso.contrato_pro_labore, 1500.50);
        assert_eq!(caso.contrato_fixo_mensal, 2000.0);
        assert_eq!(caso.proposta_exito_total, 300.0);
    }

    #[test]
    fn test_valor_malformado_vira_zero() {
        let mut linha = linha_minima();
        linha["contrato_pro_labore"] = json!("mil e quinhentos");
        linha["proposta_fixo_mensal"] = json!({ "valor": 10 });
        let caso = decodificar(linha);
        assert_eq!(caso.contrato_pro_labore, 0.0);
        assert_eq!(caso.proposta_fixo_mensal, 0.0);
    }

    #[test]
    fn test_data_aceita_rfc3339_e_data_simples() {
        let mut linha = linha_minima();
        linha["data_proposta"] = json!("2026-07-15T09:30:00-03:00");
        linha["data_contrato"] = json!("2026-07-20");
        let caso = decodificar(linha);
        assert_eq!(
            caso.data_proposta.unwrap().to_rfc3339(),
            "2026-07-15T12:30:00+00:00"
        );
        assert_eq!(
            caso.data_contrato.unwrap().to_rfc3339(),
            "2026-07-20T00:00:00+00:00"
        );
    }

    #[test]
    fn test_data_malformada_vira_ausente() {
        let mut linha = linha_minima();
        linha["data_rejeicao"] = json!("20/07/2026");
        linha["data_prospect"] = json!(12345);
        let caso = decodificar(linha);
        assert!(caso.data_rejeicao.is_none());
        assert!(caso.data_prospect.is_none());
    }

    #[test]
    fn test_referencia_prospect_cai_para_criado_em() {
        let caso = decodificar(linha_minima());
        assert_eq!(caso.data_referencia_prospect(), caso.criado_em);

        let mut linha = linha_minima();
        linha["data_prospect"] = json!("2026-07-01T00:00:00Z");
        let caso = decodificar(linha);
        assert_eq!(
            caso.data_referencia_prospect().to_rfc3339(),
            "2026-07-01T00:00:00+00:00"
        );
    }

    #[test]
    fn test_alcancou_proposta_por_status_e_historico() {
        let mut linha = linha_minima();
        linha["status"] = json!("proposta_enviada");
        assert!(decodificar(linha.clone()).alcancou_proposta());

        linha["status"] = json!("contrato_fechado");
        assert!(decodificar(linha.clone()).alcancou_proposta());

        // Rejeitada só conta se chegou a ter proposta
        linha["status"] = json!("rejeitada");
        assert!(!decodificar(linha.clone()).alcancou_proposta());
        linha["data_proposta"] = json!("2026-07-10T00:00:00Z");
        assert!(decodificar(linha).alcancou_proposta());
    }
}
