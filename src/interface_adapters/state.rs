use rand::Rng;
use rand::distributions::Alphanumeric;
use std::sync::Arc;

use crate::domain::entities::STATE_LENGTH;
use crate::domain::ports::{StateGenerator, TokenEndpoint, WebApi};
use crate::use_cases::AuthorizeSettings;

// Application state shared by every handler. Holds no session data.
#[derive(Clone)]
pub struct AppState {
    pub authorize: AuthorizeSettings,
    // Client landing page that receives the token fragment.
    pub frontend_url: String,
    // We use Arc<dyn Trait> so tests can swap in fakes for the provider.
    pub tokens: Arc<dyn TokenEndpoint>,
    pub api: Arc<dyn WebApi>,
    pub state_generator: Arc<dyn StateGenerator>,
}

// Random alphanumeric state from the thread-local CSPRNG.
#[derive(Clone, Default)]
pub struct RandomStateGenerator;

impl StateGenerator for RandomStateGenerator {
    fn generate(&self) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(STATE_LENGTH)
            .map(char::from)
            .collect()
    }
}
