mod common;
mod violations;
