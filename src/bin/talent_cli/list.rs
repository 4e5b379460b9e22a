use talent_calc::config::CalcConfig;
use talent_calc::library::TreeLibrary;

pub fn run(config: &CalcConfig) {
    let library = TreeLibrary::discover(&config.trees_dir, config.default_point_limits);
    if library.is_empty() {
        println!("No trees found in {}", config.trees_dir.display());
        return;
    }
    println!("{:>6}  {:>6}  {:<24}  path", "spec", "tree", "name");
    for file in library.files() {
        let name = match (file.class_name.is_empty(), file.spec_name.is_empty()) {
            (false, false) => format!("{} {}", file.spec_name, file.class_name),
            (true, false) => file.spec_name.clone(),
            _ => file.class_name.clone(),
        };
        println!(
            "{:>6}  {:>6}  {:<24}  {}",
            file.spec_id,
            file.tree_id,
            name,
            file.path.display()
        );
    }
}
