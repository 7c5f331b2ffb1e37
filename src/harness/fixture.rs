use std::sync::atomic::{AtomicUsize, Ordering};

use crate::app::{
    delete_app, find_firebase_config, initialize_app, load_firebase_config, FirebaseApp,
    FirebaseAppSettings, FirebaseOptions,
};
use crate::app_check::{AppCheck, AppCheckOptions, ProviderKind};
use crate::auth::Auth;
use crate::database::{Database, DatabaseReference};

use super::errors::{HarnessError, HarnessResult};
use super::logger::LOGGER;
use super::wait::process_events;

/// Root node under which every working path is created.
pub const INTEGRATION_TEST_ROOT_PATH: &str = "integration_test_data";

/// Build-time override for the connection descriptor location; empty means
/// "search the well-known places".
const FIREBASE_CONFIG: &str = "";

static FIXTURE_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Per-test fixture owning the application context and its dependent
/// sessions.
///
/// Initialization order is app, then auth, then database; `teardown`
/// releases them strictly in reverse. Any step that was skipped is skipped
/// again, silently, at teardown. Working paths created without suppression
/// are collected in the cleanup path set and removed before the database
/// session is released.
pub struct IntegrationFixture {
    provider_kind: Option<ProviderKind>,
    app: Option<FirebaseApp>,
    app_check: Option<AppCheck>,
    auth: Option<Auth>,
    database: Option<Database>,
    database_initialized: bool,
    cleanup_paths: Vec<DatabaseReference>,
}

impl IntegrationFixture {
    pub fn new() -> Self {
        Self {
            provider_kind: None,
            app: None,
            app_check: None,
            auth: None,
            database: None,
            database_initialized: false,
            cleanup_paths: Vec::new(),
        }
    }

    /// Select the attestation provider for this fixture. Must happen before
    /// `initialize_app`, since the provider configuration is handed to the
    /// App Check instance at context creation.
    pub fn configure_provider(&mut self, kind: ProviderKind) -> HarnessResult<()> {
        if self.app.is_some() {
            return Err(HarnessError::OutOfOrder {
                operation: "configure_provider",
                requires: "being called before initialize_app",
            });
        }
        LOGGER.debug(format!("Configuring {} attestation provider", kind.as_str()));
        self.provider_kind = Some(kind);
        Ok(())
    }

    /// Create the application context, loading the connection descriptor
    /// when one can be located and falling back to built-in test options.
    pub fn initialize_app(&mut self) -> HarnessResult<()> {
        LOGGER.debug("Initialize Firebase App.");

        let options = match find_firebase_config(FIREBASE_CONFIG) {
            Some(path) => load_firebase_config(&path)?,
            None => default_test_options(),
        };

        let id = FIXTURE_COUNTER.fetch_add(1, Ordering::SeqCst);
        let settings = FirebaseAppSettings {
            name: Some(format!("integration-test-{id}")),
        };

        let app = initialize_app(options, Some(settings))?;

        if let Some(kind) = self.provider_kind {
            self.app_check = Some(AppCheck::new(&app, AppCheckOptions::new(kind))?);
        }

        self.app = Some(app);
        Ok(())
    }

    /// Establish the auth session and sign in an anonymous user.
    pub async fn initialize_auth(&mut self) -> HarnessResult<()> {
        LOGGER.debug("Initializing Auth.");
        let app = self.app.as_ref().ok_or(HarnessError::OutOfOrder {
            operation: "initialize_auth",
            requires: "initialize_app",
        })?;

        let auth = Auth::new(app)?;
        if auth.current_user().is_none() {
            LOGGER.debug("Signing in.");
            auth.sign_in_anonymously().await.map_err(|err| {
                HarnessError::Auth(crate::auth::AuthError::SignInFailed {
                    message: format!(
                        "{err}. Ensure your application has the Anonymous sign-in provider \
                         enabled in the Firebase Console."
                    ),
                })
            })?;
        }

        self.auth = Some(auth);
        Ok(())
    }

    /// Bind a database session to the application context.
    pub fn initialize_database(&mut self) -> HarnessResult<()> {
        LOGGER.debug("Initializing Firebase Database.");
        let app = self.app.as_ref().ok_or(HarnessError::OutOfOrder {
            operation: "initialize_database",
            requires: "initialize_app",
        })?;
        if self.auth.is_none() {
            return Err(HarnessError::OutOfOrder {
                operation: "initialize_database",
                requires: "initialize_auth",
            });
        }

        self.database = Some(Database::get_instance(app)?);
        self.database_initialized = true;
        Ok(())
    }

    /// App, auth and database in dependency order.
    pub async fn initialize_app_auth_database(&mut self) -> HarnessResult<()> {
        self.initialize_app()?;
        self.initialize_auth().await?;
        self.initialize_database()
    }

    pub fn app(&self) -> Option<&FirebaseApp> {
        self.app.as_ref()
    }

    pub fn app_check(&self) -> Option<&AppCheck> {
        self.app_check.as_ref()
    }

    pub fn auth(&self) -> Option<&Auth> {
        self.auth.as_ref()
    }

    pub fn database(&self) -> Option<&Database> {
        self.database.as_ref()
    }

    /// Push a fresh child under the integration-test root. Unless
    /// suppressed, the path is scheduled for removal at teardown.
    pub fn create_working_path(
        &mut self,
        suppress_cleanup: bool,
    ) -> HarnessResult<DatabaseReference> {
        let database = self.database.as_ref().ok_or(HarnessError::OutOfOrder {
            operation: "create_working_path",
            requires: "initialize_database",
        })?;
        let reference = database.reference(INTEGRATION_TEST_ROOT_PATH)?.push_child();
        if !suppress_cleanup {
            self.cleanup_paths.push(reference.clone());
        }
        Ok(reference)
    }

    /// Remove every collected cleanup path, then release the database
    /// session. Removals are issued together and awaited one by one.
    pub async fn terminate_database(&mut self) {
        if !self.database_initialized {
            return;
        }

        if self.database.is_some() && !self.cleanup_paths.is_empty() {
            LOGGER.debug("Cleaning up...");
            let paths = std::mem::take(&mut self.cleanup_paths);
            let removals: Vec<_> = paths
                .iter()
                .map(|reference| reference.remove_value())
                .collect();
            for (reference, removal) in paths.iter().zip(removals) {
                if let Err(err) = removal.await {
                    LOGGER.warn(format!("Cleanup ({}) failed: {err}", reference.url()));
                }
            }
        }

        LOGGER.debug("Shutdown the Database library.");
        self.database = None;
        self.database_initialized = false;

        process_events(100).await;
    }

    /// Delete the anonymous test user (or sign a non-anonymous one out),
    /// then release the auth session.
    pub async fn terminate_auth(&mut self) {
        let Some(auth) = self.auth.take() else {
            return;
        };

        LOGGER.debug("Signing out.");
        match auth.current_user() {
            Some(user) if user.is_anonymous() => {
                if let Err(err) = auth.delete_user().await {
                    LOGGER.warn(format!("Failed to delete anonymous user: {err}"));
                    auth.sign_out();
                }
            }
            Some(_) => auth.sign_out(),
            None => {}
        }
        LOGGER.debug("Shutdown Auth.");
    }

    pub fn terminate_app_check(&mut self) {
        if self.app_check.take().is_some() {
            LOGGER.debug("Shutdown App Check.");
        }
    }

    /// Release the application context. Must come last.
    pub fn terminate_app(&mut self) {
        if let Some(app) = self.app.take() {
            LOGGER.debug("Shutdown App.");
            let _ = delete_app(&app);
        }
    }

    /// Tear everything down in reverse initialization order. Safe to call
    /// whatever subset of the lifecycle ran, and safe to call twice.
    pub async fn teardown(&mut self) {
        self.terminate_database().await;
        self.terminate_auth().await;
        self.terminate_app_check();
        self.terminate_app();
    }
}

impl Default for IntegrationFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for IntegrationFixture {
    fn drop(&mut self) {
        if self.app.is_some() {
            LOGGER.warn("IntegrationFixture dropped without teardown(); releasing app context.");
            self.terminate_app_check();
            self.terminate_app();
        }
    }
}

fn default_test_options() -> FirebaseOptions {
    FirebaseOptions {
        api_key: Some("integration-test-key".to_string()),
        project_id: Some("integration-test-project".to_string()),
        app_id: Some("1:0:integration:test".to_string()),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "current_thread")]
    async fn lifecycle_steps_enforce_dependency_order() {
        let mut fixture = IntegrationFixture::new();
        assert!(matches!(
            fixture.initialize_auth().await,
            Err(HarnessError::OutOfOrder { .. })
        ));
        assert!(matches!(
            fixture.initialize_database(),
            Err(HarnessError::OutOfOrder { .. })
        ));

        fixture.initialize_app_auth_database().await.expect("init all");
        assert!(fixture.app().is_some());
        assert!(fixture.auth().unwrap().current_user().is_some());
        assert!(fixture.database().is_some());

        fixture.teardown().await;
        assert!(fixture.app().is_none());
        assert!(fixture.auth().is_none());
        assert!(fixture.database().is_none());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn provider_configuration_must_precede_app_init() {
        let mut fixture = IntegrationFixture::new();
        fixture.initialize_app().expect("init app");
        assert!(matches!(
            fixture.configure_provider(ProviderKind::Debug),
            Err(HarnessError::OutOfOrder { .. })
        ));
        fixture.teardown().await;
    }

    #[tokio::test(flavor = "current_thread")]
    async fn teardown_without_initialization_is_a_no_op() {
        let mut fixture = IntegrationFixture::new();
        fixture.teardown().await;
        fixture.teardown().await;
    }

    #[tokio::test(flavor = "current_thread")]
    async fn cleanup_paths_are_removed_at_teardown() {
        let mut fixture = IntegrationFixture::new();
        fixture.initialize_app_auth_database().await.expect("init all");

        let working = fixture.create_working_path(false).expect("working path");
        working
            .child("marker")
            .unwrap()
            .set_value(serde_json::json!("data"))
            .await
            .unwrap();

        let database = fixture.database().unwrap().clone();
        fixture.terminate_database().await;

        let root = database
            .reference(INTEGRATION_TEST_ROOT_PATH)
            .unwrap()
            .get_value()
            .await
            .unwrap();
        assert!(!root.exists());

        fixture.teardown().await;
    }

    #[tokio::test(flavor = "current_thread")]
    async fn suppressed_working_path_survives_teardown() {
        let mut fixture = IntegrationFixture::new();
        fixture.initialize_app_auth_database().await.expect("init all");

        let suppressed = fixture.create_working_path(true).expect("working path");
        suppressed
            .set_value(serde_json::json!("keep"))
            .await
            .unwrap();

        let database = fixture.database().unwrap().clone();
        fixture.terminate_database().await;

        let read = database
            .reference(INTEGRATION_TEST_ROOT_PATH)
            .unwrap()
            .get_value()
            .await
            .unwrap();
        assert!(read.exists());

        fixture.teardown().await;
    }
}
