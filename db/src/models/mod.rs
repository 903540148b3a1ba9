pub mod activity;
pub mod attendance;
pub mod certificate;
pub mod enrollment;
pub mod hours_request;
pub mod notification;
pub mod session;
pub mod user;

pub use activity::Entity as Activity;
pub use attendance::Entity as Attendance;
pub use certificate::Entity as Certificate;
pub use enrollment::Entity as Enrollment;
pub use hours_request::Entity as HoursRequest;
pub use notification::Entity as Notification;
pub use session::Entity as Session;
pub use user::Entity as User;
