pub mod m202510010001_create_users;
pub mod m202510010002_create_activities;
pub mod m202510010003_create_sessions;
pub mod m202510010004_create_enrollments;
pub mod m202510010005_create_attendance;
pub mod m202510010006_create_hours_requests;
pub mod m202510010007_create_certificates;
pub mod m202510010008_create_notifications;
