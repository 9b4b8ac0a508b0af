pub mod bustime;
