pub mod sites;
