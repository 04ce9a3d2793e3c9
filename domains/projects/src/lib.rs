//! Projects domain: travel projects, places, status synchronization

pub mod api;
pub mod domain;
pub mod repository;
pub mod service;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{Place, Project, ProjectStatus};
pub use domain::guard::{PlaceCollectionGuard, Rejection, MAX_PLACES, MIN_PLACES};
pub use domain::state::{
    ProjectEvent, ProjectState, ProjectStateMachine, ProjectStatusSync, StateError,
};
pub use domain::validation::{validate_artworks_batch, PlaceDraft};

// Re-export repository types
pub use repository::{PlaceRepository, ProjectFilter, ProjectRepository, ProjectsRepositories};

// Re-export service types
pub use service::{
    NewProject, PlaceChanges, ProjectChanges, ProjectService, ProjectWithPlaces, SyncOutcome,
};

// Re-export API types
pub use api::routes;
pub use api::ProjectsState;
