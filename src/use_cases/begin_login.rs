use url::Url;

use crate::domain::entities::REQUESTED_SCOPES;
use crate::domain::ports::StateGenerator;

// Values the provider needs to render its consent screen.
#[derive(Debug, Clone)]
pub struct AuthorizeSettings {
    pub authorize_url: Url,
    pub client_id: String,
    pub redirect_uri: String,
}

// Outcome of a login attempt: the state to pin in a cookie and where to send the browser.
#[derive(Debug, Clone)]
pub struct LoginRedirect {
    pub state: String,
    pub location: Url,
}

pub struct BeginLoginUseCase<G> {
    pub generator: G,
    pub settings: AuthorizeSettings,
}

impl<G> BeginLoginUseCase<G>
where
    G: StateGenerator,
{
    pub fn execute(&self) -> LoginRedirect {
        let state = self.generator.generate();

        let mut location = self.settings.authorize_url.clone();
        location
            .query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.settings.client_id)
            .append_pair("scope", &REQUESTED_SCOPES.join(" "))
            .append_pair("redirect_uri", &self.settings.redirect_uri)
            .append_pair("state", &state)
            // Re-prompt every time so scope changes are granted.
            .append_pair("show_dialog", "true");

        LoginRedirect { state, location }
    }
}
