pub mod wac_engine;
