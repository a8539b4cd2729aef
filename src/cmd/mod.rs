//! CLI command implementations.
//!
//! | Module          | Commands handled                                   |
//! |-----------------|-----------------------------------------------------|
//! | `serve`         | `Serve`                                            |
//! | `processed`     | `Processed`                                        |

pub mod processed;
pub mod serve;

pub use processed::cmd_processed;
pub use serve::cmd_serve;
