use config::FileFormat;
use wiregen::config::GeneratorConfig;
use wiregen::generator::Generator;
use wiregen::manifest::Manifest;

const MANIFEST: &str = r#"{
    "requests": ["App.IGreeter"],
    "types": [
        { "identity": "App.IClock", "abstract": true, "transient": true },
        { "identity": "App.SystemClock", "implements": ["App.IClock"] },
        { "identity": "App.IGreeter", "abstract": true },
        {
            "identity": "App.Greeter",
            "implements": ["App.IGreeter"],
            "constructors": [{ "parameters": ["App.IClock"] }]
        }
    ]
}"#;

fn main() {
    // the config is read from "wiregen.json" and WIREGEN_* variables, if present
    let config = GeneratorConfig::init_from_environment().expect("error reading config");
    let manifest = Manifest::parse(MANIFEST, FileFormat::Json).expect("error parsing manifest");
    let catalog = manifest.to_catalog().expect("error creating catalog");

    let output = Generator::new(config).execute(catalog, &manifest);
    for diagnostic in &output.diagnostics {
        eprintln!("{diagnostic}");
    }

    for source in &output.sources {
        println!("// {}{}\n", source.hint_name, source.text);
    }
}
