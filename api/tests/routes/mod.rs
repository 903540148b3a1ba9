mod activities_test;
mod auth_test;
mod enrollments_test;
mod health_test;
mod hours_test;
mod me_test;
mod sessions_test;
