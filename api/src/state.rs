use sea_orm::DatabaseConnection;
use services::activity::ActivityService;
use services::attendance::AttendanceService;
use services::certificate::{CertificateRenderer, CertificateService, UrlRenderer};
use services::enrollment::EnrollmentService;
use services::hours::HoursService;
use services::notifier::{DbNotifier, Notifier};
use services::session::SessionService;
use std::sync::Arc;
use util::config;

/// Shared handles for every request: the database plus the outbound collaborators.
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    notifier: Arc<dyn Notifier>,
    renderer: Arc<dyn CertificateRenderer>,
}

impl AppState {
    /// Notifications are stored as rows; certificate links come from config.
    pub fn new(db: DatabaseConnection) -> Self {
        let notifier = Arc::new(DbNotifier::new(db.clone()));
        Self::with_collaborators(db, notifier, Arc::new(UrlRenderer::from_config()))
    }

    pub fn with_collaborators(
        db: DatabaseConnection,
        notifier: Arc<dyn Notifier>,
        renderer: Arc<dyn CertificateRenderer>,
    ) -> Self {
        Self {
            db,
            notifier,
            renderer,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn activities(&self) -> ActivityService<'_> {
        ActivityService::new(&self.db)
    }

    pub fn sessions(&self) -> SessionService<'_> {
        SessionService::from_config(&self.db)
    }

    pub fn enrollments(&self) -> EnrollmentService<'_> {
        EnrollmentService::new(&self.db, self.notifier.as_ref())
    }

    pub fn attendance(&self) -> AttendanceService<'_> {
        AttendanceService::new(&self.db)
    }

    pub fn certificates(&self) -> CertificateService<'_> {
        CertificateService::new(
            &self.db,
            self.notifier.as_ref(),
            self.renderer.as_ref(),
            config::certificate_prefix(),
        )
    }

    pub fn hours(&self) -> HoursService<'_> {
        HoursService::new(&self.db, self.notifier.as_ref(), self.certificates())
    }
}
