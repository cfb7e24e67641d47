/// Vertex shader shared by every scene mesh
pub const MESH_VERTEX_SHADER: &str = r#"#version 300 es
precision highp float;

layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;
layout(location = 2) in vec3 a_color;
layout(location = 3) in float a_opacity;
layout(location = 4) in float a_specular;

uniform mat4 u_view;
uniform mat4 u_projection;
uniform mat4 u_light_space;

out vec3 v_world_position;
out vec4 v_light_space_pos;
out vec3 v_normal;
out vec3 v_color;
out float v_opacity;
out float v_specular;

void main() {
    // Geometry is baked in world space
    v_world_position = a_position;
    v_normal = a_normal;
    v_color = a_color;
    v_opacity = a_opacity;
    v_specular = a_specular;
    v_light_space_pos = u_light_space * vec4(a_position, 1.0);

    gl_Position = u_projection * u_view * vec4(a_position, 1.0);
}
"#;

/// Fragment shader: Lambert diffuse from ambient + two directional lights,
/// an optional Phong highlight, a filtered key-light shadow, and linear
/// distance fog
pub const MESH_FRAGMENT_SHADER: &str = r#"#version 300 es
precision highp float;

in vec3 v_world_position;
in vec3 v_normal;
in vec3 v_color;
in float v_opacity;
in float v_specular;
in vec4 v_light_space_pos;

uniform vec3 u_camera_pos;
uniform vec3 u_ambient;
uniform vec3 u_key_dir;
uniform vec3 u_key_color;
uniform vec3 u_fill_dir;
uniform vec3 u_fill_color;
uniform float u_shininess;
uniform vec3 u_fog_color;
uniform vec2 u_fog_range;
uniform sampler2D u_shadow_map;
uniform float u_shadow_bias;
uniform bool u_receive_shadow;

out vec4 fragColor;

// 1.0 fully lit by the key light, 0.0 fully blocked
float key_visibility() {
    if (!u_receive_shadow) {
        return 1.0;
    }
    vec3 p = v_light_space_pos.xyz / v_light_space_pos.w * 0.5 + 0.5;
    // Outside the map counts as lit
    if (p.z > 1.0 || any(lessThan(p.xy, vec2(0.0))) || any(greaterThan(p.xy, vec2(1.0)))) {
        return 1.0;
    }

    // 3x3 percentage-closer filter
    vec2 texel = 1.0 / vec2(textureSize(u_shadow_map, 0));
    float lit = 0.0;
    for (int x = -1; x <= 1; x++) {
        for (int y = -1; y <= 1; y++) {
            float closest = texture(u_shadow_map, p.xy + vec2(x, y) * texel).r;
            lit += (p.z - u_shadow_bias > closest) ? 0.0 : 1.0;
        }
    }
    return lit / 9.0;
}

vec3 light_contribution(vec3 normal, vec3 view_dir, vec3 light_dir, vec3 light_color) {
    float ndotl = max(dot(normal, light_dir), 0.0);
    vec3 diffuse = v_color * light_color * ndotl;

    vec3 half_dir = normalize(light_dir + view_dir);
    float spec = pow(max(dot(normal, half_dir), 0.0), u_shininess);
    vec3 specular = v_color * v_specular * spec * light_color * step(0.0, ndotl);

    return diffuse + specular;
}

void main() {
    vec3 normal = normalize(v_normal);
    vec3 view_dir = normalize(u_camera_pos - v_world_position);

    // Light both faces of open or translucent shapes
    if (!gl_FrontFacing) {
        normal = -normal;
    }

    vec3 color = v_color * u_ambient;
    color += key_visibility() * light_contribution(normal, view_dir, u_key_dir, u_key_color);
    color += light_contribution(normal, view_dir, u_fill_dir, u_fill_color);

    float dist = length(v_world_position - u_camera_pos);
    float fog = clamp((dist - u_fog_range.x) / max(u_fog_range.y - u_fog_range.x, 0.0001), 0.0, 1.0);
    color = mix(color, u_fog_color, fog);

    fragColor = vec4(color, v_opacity);
}
"#;

/// Depth-only pass from the key light
pub const SHADOW_VERTEX_SHADER: &str = r#"#version 300 es
precision highp float;

layout(location = 0) in vec3 a_position;

uniform mat4 u_light_space;

void main() {
    gl_Position = u_light_space * vec4(a_position, 1.0);
}
"#;

pub const SHADOW_FRAGMENT_SHADER: &str = r#"#version 300 es
precision mediump float;

void main() {
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shader_version() {
        assert!(MESH_VERTEX_SHADER.starts_with("#version 300 es"));
        assert!(MESH_FRAGMENT_SHADER.starts_with("#version 300 es"));
        assert!(SHADOW_VERTEX_SHADER.starts_with("#version 300 es"));
        assert!(SHADOW_FRAGMENT_SHADER.starts_with("#version 300 es"));
    }

    #[test]
    fn test_attribute_locations_match_vertex_layout() {
        // Five attributes covering the 11-float vertex
        for (loc, name) in ["a_position", "a_normal", "a_color", "a_opacity", "a_specular"]
            .iter()
            .enumerate()
        {
            let decl = format!("layout(location = {}) in", loc);
            let line = MESH_VERTEX_SHADER
                .lines()
                .find(|l| l.contains(name))
                .unwrap_or_default();
            assert!(line.starts_with(&decl), "{} should be at location {}", name, loc);
        }
    }

    #[test]
    fn test_fragment_uniforms_declared() {
        for uniform in ["u_ambient", "u_key_dir", "u_fill_color", "u_fog_range", "u_shininess"] {
            assert!(MESH_FRAGMENT_SHADER.contains(uniform));
        }
    }

    #[test]
    fn test_shadow_pass_shares_position_location() {
        assert!(SHADOW_VERTEX_SHADER.contains("layout(location = 0) in vec3 a_position;"));
        assert!(SHADOW_VERTEX_SHADER.contains("u_light_space"));
        assert!(MESH_VERTEX_SHADER.contains("u_light_space"));
        // Depth only, no color output
        assert!(!SHADOW_FRAGMENT_SHADER.contains("out vec4"));
    }

    #[test]
    fn test_shadow_only_attenuates_key_light() {
        for uniform in ["u_shadow_map", "u_shadow_bias", "u_receive_shadow"] {
            assert!(MESH_FRAGMENT_SHADER.contains(uniform));
        }
        let shadowed: Vec<&str> = MESH_FRAGMENT_SHADER
            .lines()
            .filter(|l| l.contains("key_visibility()") && l.contains("color +="))
            .collect();
        assert_eq!(shadowed.len(), 1);
        assert!(shadowed[0].contains("u_key_dir"));
        assert!(!MESH_FRAGMENT_SHADER
            .lines()
            .any(|l| l.contains("u_fill_dir") && l.contains("key_visibility")));
    }
}
