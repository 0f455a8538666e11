// Summary collaborators: an external summary endpoint and the Claude
// Messages API, plus the prompt they are given.

pub mod client;
pub mod prompt;
