use keycopy::{default_file_name, BladeBuilder, KeyCode, KeyProfile, StlWriter};
use std::error::Error;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <profile.json> <code> [out.stl]", args[0]);
        std::process::exit(2);
    }

    let profile_path = Path::new(&args[1]);
    let profile = KeyProfile::from_json_file(profile_path)?;
    let cut = profile.cut_profile(profile_path.parent());
    let code: KeyCode = args[2].parse()?;

    let mesh = BladeBuilder::new(&cut).build(&code)?;
    println!("Built {} triangles for code {}.", mesh.len(), code);

    let out_path = match args.get(3) {
        Some(p) => p.clone(),
        None => {
            let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
            default_file_name(&profile.profile_name, &code, now)
        }
    };
    StlWriter::default().write_file(&mesh, &cut.shaft_path, Path::new(&out_path))?;
    println!("Wrote {out_path}");
    Ok(())
}
