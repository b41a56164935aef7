//! Координація флоту роботів за маяками.
//!
//! Координатор збирає звіти маяків про позиції, групує маяки в кластери,
//! ділить флот між кластерами пропорційно їхньому розміру і розсилає одну
//! ціль на агента. Кожен агент їде до своєї цілі, оминаючи перешкоди, які
//! бачать його датчики відстані.

pub mod agent;
pub mod allocation;
pub mod avoidance;
pub mod beacon;
pub mod cluster;
pub mod coordinator;
pub mod core;
pub mod dispatch;
pub mod motion;
pub mod navigation;
pub mod registry;
pub mod settings;
pub mod sim;
pub mod transport;
pub mod wire;

pub use crate::agent::{Agent, Body};
pub use crate::allocation::{allocate, AllocationPlan};
pub use crate::cluster::ClusterEngine;
pub use crate::coordinator::{Coordinator, Reassignment};
pub use crate::core::{
    AgentId, AgentStatus, BeaconRecord, Cluster, DestinationAssignment, NavState, Position,
    SwarmError, WireError,
};
pub use crate::dispatch::dispatch;
pub use crate::registry::BeaconRegistry;
pub use crate::settings::Settings;
pub use crate::wire::Message;
