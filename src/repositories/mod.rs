pub(crate) mod attempts;
pub(crate) mod exams;
pub(crate) mod health;
pub(crate) mod question_bank;
pub(crate) mod study_packs;
pub(crate) mod users;
