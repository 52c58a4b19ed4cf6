pub mod auditoria;
pub mod casos;
pub mod dashboard;
pub mod documentos;
pub mod health;
pub mod kanban;

pub use auditoria::*;
pub use casos::*;
pub use dashboard::*;
pub use documentos::*;
pub use health::*;
pub use kanban::*;
