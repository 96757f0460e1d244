pub use crate::error::EpinetError;
pub use crate::history::{symptomatic_history, HistorySweep};
pub use crate::log::{debug, error, info, trace, warn};
pub use crate::monte_carlo::{run_batch, run_single, BatchConfig, BatchSummary};
pub use crate::network::{AdjacencyMatrix, Link, Node};
pub use crate::people::{DiseaseParams, Person};
pub use crate::propagation::{propagate, RunStats};
pub use crate::queue::{AttemptQueue, InfectionAttempt};
pub use crate::report::{write_summary, ReportWriter};
