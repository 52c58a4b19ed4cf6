//! Agregador de métricas do dashboard da controladoria.
//!
//! Função pura sobre a lista de casos: nenhum I/O, nenhum estado retido
//! entre chamadas. A busca das linhas é responsabilidade do colaborador de
//! acesso a dados; aqui só entra aritmética de uma passada sobre o vetor.
//!
//! Convenções de data: todo o bucketing usa o calendário UTC (a convenção
//! de armazenamento do backend). Semana começa na segunda-feira (ISO) à
//! meia-noite; mês no dia 1. Taxas de conversão são arredondadas para uma
//! casa decimal e divisão por zero resulta em 0.0, nunca NaN.

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use serde::Serialize;

use crate::models::caso::{Caso, StatusCaso};

/// Resultado completo de uma agregação, pronto para o dashboard
#[derive(Debug, Clone, Serialize)]
pub struct DashboardMetrics {
    pub semana: ResumoPeriodo,
    pub mes: ResumoPeriodo,
    pub geral: ResumoGeral,
    pub funil: FunilConversao,
    /// Sempre exatamente 6 entradas, do mês mais antigo para o atual
    pub evolucao: Vec<EvolucaoMensal>,
    /// Os 5 casos mais recentes por criado_em, decrescente
    pub recentes: Vec<Caso>,
}

/// Contadores de uma janela de período (semana ou mês corrente)
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResumoPeriodo {
    pub novos: u64,
    pub propostas_qtd: u64,
    pub propostas_pro_labore: f64,
    pub propostas_fixo_mensal: f64,
    pub propostas_exito: f64,
    pub fechamentos_qtd: u64,
    pub fechamentos_pro_labore: f64,
    pub fechamentos_fixo_mensal: f64,
    pub fechamentos_exito: f64,
    pub rejeitadas: u64,
}

/// Contadores de carteira (vida inteira, sem janela)
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResumoGeral {
    pub sob_analise: u64,
    pub propostas_enviadas: u64,
    pub fechados: u64,
    pub assinados: u64,
    pub nao_assinados: u64,
    pub rejeitados: u64,
    pub probono: u64,
    pub total_fechado_pro_labore: f64,
    pub total_fechado_exito: f64,
    /// Soma dos fixos mensais dos contratos fechados
    pub receita_recorrente_ativa: f64,
    pub em_negociacao_pro_labore: f64,
    pub em_negociacao_fixo_mensal: f64,
    pub em_negociacao_exito: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FunilConversao {
    pub total_entrada: u64,
    pub qualificados_proposta: u64,
    pub fechados: u64,
    pub perda_analise: u64,
    pub perda_negociacao: u64,
    /// qualificados / entrada, em %, uma casa decimal
    pub taxa_conversao_proposta: f64,
    /// fechados / qualificados, em %, uma casa decimal
    pub taxa_conversao_fechamento: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvolucaoMensal {
    /// Chave do mês no formato `AAAA-MM`
    pub mes: String,
    /// Rótulo curto para o gráfico, ex.: `ago/2026`
    pub rotulo: String,
    pub prospects: u64,
    pub propostas: u64,
    pub fechamentos: u64,
    pub rejeicoes: u64,
}

/// Janela fechada `[inicio, fim]`
struct Janela {
    inicio: DateTime<Utc>,
    fim: DateTime<Utc>,
}

impl Janela {
    fn contem(&self, instante: DateTime<Utc>) -> bool {
        instante >= self.inicio && instante <= self.fim
    }
}

/// Agrega a fotografia completa do dashboard a partir da lista de casos.
///
/// Total e determinística: linhas com campos malformados já chegaram
/// normalizadas (valor 0, data ausente) pela decodificação de [`Caso`],
/// então nenhuma entrada bem-tipada provoca erro. A ordem dos casos é
/// irrelevante — toda acumulação é soma.
pub fn agregar(casos: &[Caso], agora: DateTime<Utc>) -> DashboardMetrics {
    let janela_semana = Janela {
        inicio: inicio_da_semana(agora),
        fim: agora,
    };
    let janela_mes = Janela {
        inicio: inicio_do_mes(agora),
        fim: agora,
    };

    let mut semana = ResumoPeriodo::default();
    let mut mes = ResumoPeriodo::default();
    let mut geral = ResumoGeral::default();
    let mut funil = FunilConversao::default();
    let mut evolucao = baldes_de_evolucao(agora);

    for caso in casos {
        classificar_geral(&mut geral, caso);
        classificar_periodo(&mut semana, caso, &janela_semana);
        classificar_periodo(&mut mes, caso, &janela_mes);
        classificar_funil(&mut funil, caso);
        classificar_evolucao(&mut evolucao, caso);
    }

    funil.taxa_conversao_proposta = taxa_percentual(funil.qualificados_proposta, funil.total_entrada);
    funil.taxa_conversao_fechamento =
        taxa_percentual(funil.fechados, funil.qualificados_proposta);

    DashboardMetrics {
        semana,
        mes,
        geral,
        funil,
        evolucao,
        recentes: casos_recentes(casos, 5),
    }
}

fn classificar_geral(geral: &mut ResumoGeral, caso: &Caso) {
    match caso.status {
        StatusCaso::SobAnalise => geral.sob_analise += 1,
        StatusCaso::PropostaEnviada => {
            geral.propostas_enviadas += 1;
            geral.em_negociacao_pro_labore += caso.proposta_pro_labore;
            geral.em_negociacao_fixo_mensal += caso.proposta_fixo_mensal;
            geral.em_negociacao_exito += caso.proposta_exito_total;
        }
        StatusCaso::ContratoFechado => {
            geral.fechados += 1;
            if caso.contrato_assinado == Some(true) {
                geral.assinados += 1;
            } else {
                geral.nao_assinados += 1;
            }
            geral.total_fechado_pro_labore += caso.contrato_pro_labore;
            geral.total_fechado_exito += caso.contrato_exito_total;
            geral.receita_recorrente_ativa += caso.contrato_fixo_mensal;
        }
        StatusCaso::Rejeitada => geral.rejeitados += 1,
        StatusCaso::Probono => geral.probono += 1,
        StatusCaso::Desconhecido => {}
    }
}

fn classificar_periodo(resumo: &mut ResumoPeriodo, caso: &Caso, janela: &Janela) {
    if janela.contem(caso.data_referencia_prospect()) {
        resumo.novos += 1;
    }

    match caso.status {
        StatusCaso::PropostaEnviada => {
            if caso.data_proposta.is_some_and(|d| janela.contem(d)) {
                resumo.propostas_qtd += 1;
                resumo.propostas_pro_labore += caso.proposta_pro_labore;
                resumo.propostas_fixo_mensal += caso.proposta_fixo_mensal;
                resumo.propostas_exito += caso.proposta_exito_total;
            }
        }
        StatusCaso::ContratoFechado => {
            if caso.data_contrato.is_some_and(|d| janela.contem(d)) {
                resumo.fechamentos_qtd += 1;
                resumo.fechamentos_pro_labore += caso.contrato_pro_labore;
                resumo.fechamentos_fixo_mensal += caso.contrato_fixo_mensal;
                resumo.fechamentos_exito += caso.contrato_exito_total;
            }
        }
        StatusCaso::Rejeitada => {
            if caso.data_rejeicao.is_some_and(|d| janela.contem(d)) {
                resumo.rejeitadas += 1;
            }
        }
        _ => {}
    }
}

fn classificar_funil(funil: &mut FunilConversao, caso: &Caso) {
    funil.total_entrada += 1;

    if caso.alcancou_proposta() {
        funil.qualificados_proposta += 1;
    }

    match caso.status {
        StatusCaso::ContratoFechado => funil.fechados += 1,
        StatusCaso::Rejeitada => {
            // Exclusão mútua: a presença de data_proposta decide
            if caso.data_proposta.is_some() {
                funil.perda_negociacao += 1;
            } else {
                funil.perda_analise += 1;
            }
        }
        _ => {}
    }
}

fn classificar_evolucao(baldes: &mut [EvolucaoMensal], caso: &Caso) {
    incrementar_balde(baldes, Some(caso.data_referencia_prospect()), |b| {
        b.prospects += 1
    });

    if caso.alcancou_proposta() {
        incrementar_balde(baldes, caso.data_proposta, |b| b.propostas += 1);
    }
    if caso.status == StatusCaso::ContratoFechado {
        incrementar_balde(baldes, caso.data_contrato, |b| b.fechamentos += 1);
    }
    if caso.status == StatusCaso::Rejeitada {
        incrementar_balde(baldes, caso.data_rejeicao, |b| b.rejeicoes += 1);
    }
}

fn incrementar_balde<F>(baldes: &mut [EvolucaoMensal], data: Option<DateTime<Utc>>, inc: F)
where
    F: FnOnce(&mut EvolucaoMensal),
{
    let Some(data) = data else { return };
    let chave = chave_do_mes(data.year(), data.month());
    if let Some(balde) = baldes.iter_mut().find(|b| b.mes == chave) {
        inc(balde);
    }
}

/// Meia-noite da segunda-feira mais recente (início de semana ISO)
fn inicio_da_semana(agora: DateTime<Utc>) -> DateTime<Utc> {
    let hoje = agora.date_naive();
    let recuo = hoje.weekday().num_days_from_monday() as i64;
    (hoje - Duration::days(recuo)).and_time(NaiveTime::MIN).and_utc()
}

/// Meia-noite do dia 1 do mês corrente
fn inicio_do_mes(agora: DateTime<Utc>) -> DateTime<Utc> {
    let hoje = agora.date_naive();
    hoje.with_day(1)
        .unwrap_or(hoje)
        .and_time(NaiveTime::MIN)
        .and_utc()
}

/// Exatamente 6 baldes mensais: do mês `agora - 5` até o mês corrente
fn baldes_de_evolucao(agora: DateTime<Utc>) -> Vec<EvolucaoMensal> {
    let mut ano = agora.year();
    let mut mes = agora.month();
    let mut chaves = vec![(ano, mes)];
    for _ in 0..5 {
        if mes == 1 {
            mes = 12;
            ano -= 1;
        } else {
            mes -= 1;
        }
        chaves.push((ano, mes));
    }
    chaves.reverse();

    chaves
        .into_iter()
        .map(|(ano, mes)| EvolucaoMensal {
            mes: chave_do_mes(ano, mes),
            rotulo: rotulo_do_mes(ano, mes),
            prospects: 0,
            propostas: 0,
            fechamentos: 0,
            rejeicoes: 0,
        })
        .collect()
}

fn chave_do_mes(ano: i32, mes: u32) -> String {
    format!("{:04}-{:02}", ano, mes)
}

fn rotulo_do_mes(ano: i32, mes: u32) -> String {
    const ABREVIACOES: [&str; 12] = [
        "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
    ];
    let nome = ABREVIACOES
        .get(mes.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("???");
    format!("{}/{}", nome, ano)
}

/// `parte / todo * 100`, uma casa decimal; denominador zero resulta em 0.0
fn taxa_percentual(parte: u64, todo: u64) -> f64 {
    if todo == 0 {
        return 0.0;
    }
    (parte as f64 / todo as f64 * 1000.0).round() / 10.0
}

/// Top-k por criado_em decrescente; empates preservam a ordem original
fn casos_recentes(casos: &[Caso], k: usize) -> Vec<Caso> {
    let mut ordenados: Vec<Caso> = casos.to_vec();
    ordenados.sort_by(|a, b| b.criado_em.cmp(&a.criado_em));
    ordenados.truncate(k);
    ordenados
}
