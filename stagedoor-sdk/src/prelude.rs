//! Common imports for quick starts.

// Common
pub use crate::{BuildError, ClientConfig, Error, Result};

// Transport and façade
pub use crate::{HttpClient, HttpClientBuilder, Stagedoor};

// Session and routing
pub use crate::{AuthStatus, SessionState, SessionStore};
pub use crate::{GuardMachine, GuardPhase, RouteGuard};
pub use crate::{MemoryNavigator, Navigator};

// Queries
pub use crate::{Mutation, MutationState, Page, QueryKey};

// Forms
pub use crate::forms::{
    CastingCallForm, EducationForm, ExperienceForm, LoginForm, MessageForm, OtpEvent, OtpInput,
    ProfileForm, ProjectForm, RegistrationForm,
};
pub use crate::{FieldErrors, FormState, Validate};

// Request bodies
pub use crate::api::{Credentials, FileUpload, NewAccount};
// Domain models
pub use stagedoor_common::{User, UserType};
