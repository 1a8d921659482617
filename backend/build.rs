use std::{fs, path::Path};

fn main() {
    // the frontend is embedded in the binary, an empty folder keeps the
    // backend buildable without a frontend build
    let path = "../frontend/dist";
    if !Path::new(&path).exists() {
        fs::create_dir_all(path).expect("Could not create a frontend/dist folder");
    }
}
