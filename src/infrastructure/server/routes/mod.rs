pub(super) mod cad;
pub(super) mod chat;
pub(super) mod images;
pub(super) mod neows;
