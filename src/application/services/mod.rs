//! Application services - Use case implementations
//!
//! Each service follows hexagonal architecture principles, accepting port
//! dependencies and returning domain values.

pub mod encounter_service;
pub mod party_service;

pub use encounter_service::{EncounterService, EncounterServiceImpl, RollInitiativeRequest};
pub use party_service::{
    CreatePartyMemberRequest, PartyService, PartyServiceImpl, UpdatePartyMemberRequest,
    ValidationError,
};
