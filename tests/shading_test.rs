use approx::assert_relative_eq;
use tri_ngin::{
    Point3, Vector3, Vector4,
    data_structures::material::Material,
    pipelines::light::{BlendMode, Light, LightingTerms},
};

fn lighting(ambient: f32, diffuse: f32, specular: f32) -> LightingTerms {
    LightingTerms {
        ambient: Vector3::new(ambient, ambient, ambient),
        diffuse: Vector3::new(diffuse, diffuse, diffuse),
        specular: Vector3::new(specular, specular, specular),
    }
}

#[test]
fn replace_ignores_lighting() {
    let texel = Vector4::new(0.2, 0.4, 0.6, 1.0);
    let colour = BlendMode::Replace.shade(texel, &lighting(0.1, 0.1, 0.1), 1.0);
    assert_eq!(colour, texel);
}

#[test]
fn modulate_multiplies_clamped_lighting() {
    let texel = Vector4::new(0.5, 0.5, 1.0, 1.0);
    let colour = BlendMode::Modulate.shade(texel, &lighting(0.1, 0.2, 0.1), 1.0);
    assert_relative_eq!(colour.x, 0.2, epsilon = 1e-6);
    assert_relative_eq!(colour.z, 0.4, epsilon = 1e-6);

    // lighting saturates at one
    let colour = BlendMode::Modulate.shade(texel, &lighting(0.5, 0.8, 0.9), 1.0);
    assert_relative_eq!(colour.x, 0.5, epsilon = 1e-6);
    assert_relative_eq!(colour.z, 1.0, epsilon = 1e-6);
}

#[test]
fn fallback_texel_under_modulate_is_the_lighting() {
    let white = Vector4::new(1.0, 1.0, 1.0, 1.0);
    let colour = BlendMode::Modulate.shade(white, &lighting(0.2, 0.3, 0.1), 1.0);
    assert_relative_eq!(colour.y, 0.6, epsilon = 1e-6);
}

#[test]
fn alpha_is_texel_alpha_times_material_alpha() {
    let texel = Vector4::new(1.0, 1.0, 1.0, 0.5);
    for mode in [BlendMode::Replace, BlendMode::Modulate] {
        let colour = mode.shade(texel, &lighting(1.0, 0.0, 0.0), 0.5);
        assert_relative_eq!(colour.w, 0.25, epsilon = 1e-6);
    }
}

#[test]
fn blend_mode_toggles_and_defaults_to_modulate() {
    assert_eq!(BlendMode::default(), BlendMode::Modulate);
    assert_eq!(BlendMode::Modulate.toggled(), BlendMode::Replace);
    assert_eq!(BlendMode::Replace.toggled().toggled(), BlendMode::Replace);
    assert_eq!(BlendMode::Replace.as_uniform(), 0);
    assert_eq!(BlendMode::Modulate.as_uniform(), 1);
}

#[test]
fn surface_facing_the_light_gets_full_diffuse() {
    let light = Light {
        position: [0.0, 2.0, 0.0],
        ..Light::default()
    };
    let material = Material::default();
    let terms = light.terms(
        &material,
        Vector3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.0, 2.0, 0.0),
    );
    assert_relative_eq!(terms.ambient.x, Material::DEFAULT_AMBIENT[0], epsilon = 1e-6);
    assert_relative_eq!(terms.diffuse.x, Material::DEFAULT_DIFFUSE[0], epsilon = 1e-6);
    assert_relative_eq!(terms.specular.x, Material::DEFAULT_SPECULAR[0], epsilon = 1e-6);
}

#[test]
fn surface_facing_away_gets_only_ambient() {
    let light = Light {
        position: [0.0, -2.0, 0.0],
        ..Light::default()
    };
    let terms = light.terms(
        &Material::default(),
        Vector3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.0, -2.0, 0.0),
    );
    assert_relative_eq!(terms.diffuse.x, 0.0, epsilon = 1e-6);
    assert_relative_eq!(terms.specular.x, 0.0, epsilon = 1e-6);
    assert_relative_eq!(terms.combined().x, Material::DEFAULT_AMBIENT[0], epsilon = 1e-6);
}
