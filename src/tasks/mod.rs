pub mod reminder_loop;
