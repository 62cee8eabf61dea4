fn main() -> anyhow::Result<()> {
    material_spheres::run()
}
