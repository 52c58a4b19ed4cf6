pub mod caso;
pub mod lifecycle;

pub use caso::{AtualizacaoCaso, Caso, StatusCaso};
pub use lifecycle::{aplicar_transicao, Estagio, ErroLifecycle, NovoCaso, ValoresHonorarios};
