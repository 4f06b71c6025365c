// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod columns;
pub mod compose;
pub mod error;
pub mod events;
pub mod filter;
pub mod forms;
pub mod grid;
pub mod grouping;
pub mod model;
pub mod search;
pub mod sort;
pub mod source;
pub mod state;
pub mod transport;

pub use columns::*;
pub use compose::*;
pub use error::*;
pub use events::*;
pub use filter::*;
pub use forms::*;
pub use grid::*;
pub use grouping::*;
pub use model::*;
pub use search::{SearchOutcome, SearchSpec};
pub use sort::*;
pub use source::*;
pub use state::*;
