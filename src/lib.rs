pub mod country;
pub mod error;
pub mod locate;
pub mod meta;
pub mod monthly;
pub mod normalize;
pub mod pipeline;
pub mod rank;
pub mod trend;
