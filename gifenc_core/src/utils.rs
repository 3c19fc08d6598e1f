use colour::red;

pub fn print_intro() {
    println!(
        r#"
        _ ____
   ____ _(_) __/__  ____  _____
  / __ `/ / /_/ _ \/ __ \/ ___/
 / /_/ / / __/  __/ / / / /__
 \__, /_/_/  \___/_/ /_/\___/
/____/                        "#
    );

    if cfg!(debug_assertions) {
        red!("\nWARNING: YOU ARE RUNNING IN DEBUG MODE. Keep in mind that everything is way slower than it should be.\n\n");
    }
}
