//! Unit test modules.

mod daily_score_test;
