mod common;
mod peace;
