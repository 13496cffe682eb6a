pub mod access_events;
pub mod people;
pub mod personnel;

#[cfg(test)]
mod tests;
