mod preferences;
mod support;
