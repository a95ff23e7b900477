//! Integration tests for castplayer.


mod cli_test;
mod player_test;
