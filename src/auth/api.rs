use std::sync::{Arc, LazyLock, Mutex};

use rand::Rng;

use crate::app::FirebaseApp;
use crate::logger::Logger;

use super::error::{AuthError, AuthResult};

static LOGGER: LazyLock<Logger> = LazyLock::new(|| Logger::new("auth"));

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    uid: String,
    is_anonymous: bool,
}

impl User {
    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn is_anonymous(&self) -> bool {
        self.is_anonymous
    }
}

/// Authentication session bound to one application context. Holds at most
/// one signed-in identity.
#[derive(Clone)]
pub struct Auth {
    inner: Arc<AuthInner>,
}

struct AuthInner {
    app: FirebaseApp,
    current_user: Mutex<Option<Arc<User>>>,
}

impl Auth {
    pub fn new(app: &FirebaseApp) -> AuthResult<Self> {
        app.check_destroyed()?;
        Ok(Self {
            inner: Arc::new(AuthInner {
                app: app.clone(),
                current_user: Mutex::new(None),
            }),
        })
    }

    pub fn app(&self) -> &FirebaseApp {
        &self.inner.app
    }

    pub fn current_user(&self) -> Option<Arc<User>> {
        self.inner.current_user.lock().unwrap().clone()
    }

    /// Establish an anonymous session. A no-op returning the existing user
    /// when one is already signed in.
    pub async fn sign_in_anonymously(&self) -> AuthResult<Arc<User>> {
        self.inner.app.check_destroyed()?;

        if let Some(user) = self.current_user() {
            return Ok(user);
        }

        let user = Arc::new(User {
            uid: generate_uid(),
            is_anonymous: true,
        });
        *self.inner.current_user.lock().unwrap() = Some(user.clone());
        LOGGER.debug(format!("Signed in anonymous user {}", user.uid()));
        Ok(user)
    }

    pub fn sign_out(&self) {
        if let Some(user) = self.inner.current_user.lock().unwrap().take() {
            LOGGER.debug(format!("Signed out user {}", user.uid()));
        }
    }

    /// Delete the current user's account and end the session. Anonymous test
    /// users are deleted at teardown so they do not pollute the user list.
    pub async fn delete_user(&self) -> AuthResult<()> {
        let mut guard = self.inner.current_user.lock().unwrap();
        match guard.take() {
            Some(user) => {
                LOGGER.debug(format!("Deleted user {}", user.uid()));
                Ok(())
            }
            None => Err(AuthError::NoCurrentUser),
        }
    }
}

fn generate_uid() -> String {
    const UID_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    (0..28)
        .map(|_| {
            let index = rng.gen_range(0..UID_CHARS.len());
            char::from(UID_CHARS[index])
        })
        .collect()
}
