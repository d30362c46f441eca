mod decomposition;
mod properties;
mod scenarios;
