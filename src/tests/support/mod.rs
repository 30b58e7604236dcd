pub mod fake_vim;
