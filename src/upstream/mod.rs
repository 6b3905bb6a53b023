//! Upstream gerador de respostas.
//!
//! O cache fica na frente de uma chamada cara a um modelo generativo.
//! Aqui essa chamada é simulada por um atraso configurável.

mod base;
mod simulated;

pub use base::Generator;
pub use simulated::SimulatedGenerator;
