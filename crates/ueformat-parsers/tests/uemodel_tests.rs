//! Integration tests for the UEMODEL parser
//!
//! Fixtures are serialized in memory with the same layout the exporter
//! writes: container envelope, then sections of (name, count, byte size)
//! with LOD chunk lists inside the LODS section.

use std::io::Cursor;

use ueformat_core::{Vec2, Vec3};
use ueformat_parsers::uemodel::{ANIM_IDENTIFIER, MODEL_IDENTIFIER, UEF_MAGIC};
use ueformat_parsers::{
    CompressionMethod, Decompressor, ParseError, ParseOptions, Parser, UeModel, UeModelParser,
};

// ==================== fixture builders ====================

fn push_i32(out: &mut Vec<u8>, value: i32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn push_f32(out: &mut Vec<u8>, value: f32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn push_string(out: &mut Vec<u8>, value: &str) {
    push_i32(out, value.len() as i32);
    out.extend_from_slice(value.as_bytes());
}

/// Serialize one section or chunk: name, element count, byte size, body
fn chunk(name: &str, count: usize, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    push_string(&mut out, name);
    push_i32(&mut out, count as i32);
    push_i32(&mut out, body.len() as i32);
    out.extend_from_slice(body);
    out
}

/// Serialize one LOD entry: name, chunk-list byte size, chunk list
fn lod_entry(name: &str, chunks: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    push_string(&mut out, name);
    let list_size: usize = chunks.iter().map(|c| c.len()).sum();
    push_i32(&mut out, list_size as i32);
    for chunk in chunks {
        out.extend_from_slice(chunk);
    }
    out
}

/// Serialize a LODS section from prebuilt LOD entries
fn lods_section(lods: &[Vec<u8>]) -> Vec<u8> {
    let body: Vec<u8> = lods.iter().flatten().copied().collect();
    let mut out = Vec::new();
    push_string(&mut out, "LODS");
    push_i32(&mut out, lods.len() as i32);
    push_i32(&mut out, body.len() as i32);
    out.extend_from_slice(&body);
    out
}

/// Serialize an uncompressed container around a payload
fn container_raw(identifier: &str, version: u8, object_name: &str, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(UEF_MAGIC);
    push_string(&mut out, identifier);
    out.push(version);
    push_string(&mut out, object_name);
    out.push(0);
    out.extend_from_slice(payload);
    out
}

/// Serialize a compressed container; `declared_uncompressed` overrides the
/// header field to craft size-lie fixtures
fn container_compressed(
    version: u8,
    object_name: &str,
    method: &CompressionMethod,
    payload: &[u8],
    declared_uncompressed: Option<usize>,
) -> Vec<u8> {
    let compressed = Decompressor::compress(payload, method).unwrap();

    let mut out = Vec::new();
    out.extend_from_slice(UEF_MAGIC);
    push_string(&mut out, MODEL_IDENTIFIER);
    out.push(version);
    push_string(&mut out, object_name);
    out.push(1);
    push_string(&mut out, method.name());
    push_i32(
        &mut out,
        declared_uncompressed.unwrap_or(payload.len()) as i32,
    );
    push_i32(&mut out, compressed.len() as i32);
    out.extend_from_slice(&compressed);
    out
}

fn quad_positions() -> Vec<Vec3> {
    vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
    ]
}

/// Chunk list for a quad with every decoded stream populated
fn quad_chunks() -> Vec<Vec<u8>> {
    let positions = quad_positions();
    let mut vertices = Vec::new();
    for p in &positions {
        push_f32(&mut vertices, p.x);
        push_f32(&mut vertices, p.y);
        push_f32(&mut vertices, p.z);
    }

    let mut indices = Vec::new();
    for i in [0i32, 1, 2, 0, 2, 3] {
        push_i32(&mut indices, i);
    }

    // Normals serialized W,X,Y,Z
    let mut normals = Vec::new();
    for _ in 0..4 {
        push_f32(&mut normals, -1.0); // W
        push_f32(&mut normals, 0.0); // X
        push_f32(&mut normals, 0.0); // Y
        push_f32(&mut normals, 1.0); // Z
    }

    let mut colors = Vec::new();
    push_string(&mut colors, "COL0");
    push_i32(&mut colors, 4);
    for v in 0..4u8 {
        colors.extend_from_slice(&[v, v, v, 255]);
    }

    let uvs = [
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(0.0, 1.0),
    ];
    let mut texcoords = Vec::new();
    push_i32(&mut texcoords, 4);
    for uv in &uvs {
        push_f32(&mut texcoords, uv.x);
        push_f32(&mut texcoords, uv.y);
    }

    let mut materials = Vec::new();
    push_string(&mut materials, "M_Base");
    push_i32(&mut materials, 0);
    push_i32(&mut materials, 2);

    vec![
        chunk("VERTICES", 4, &vertices),
        chunk("INDICES", 6, &indices),
        chunk("NORMALS", 4, &normals),
        chunk("VERTEXCOLORS", 1, &colors),
        chunk("TEXCOORDS", 1, &texcoords),
        chunk("MATERIALS", 1, &materials),
    ]
}

fn parse(bytes: Vec<u8>) -> Result<UeModel, ParseError> {
    UeModelParser::new().parse(Cursor::new(bytes))
}

fn parse_strict(bytes: Vec<u8>) -> Result<UeModel, ParseError> {
    let options = ParseOptions {
        strict_validation: true,
        ..Default::default()
    };
    UeModelParser::new().parse_with_options(Cursor::new(bytes), &options, None)
}

// ==================== container tests ====================

mod container {
    use super::*;

    #[test]
    fn parses_uncompressed_quad() {
        let section = lods_section(&[lod_entry("LOD0", &quad_chunks())]);
        let file = container_raw(MODEL_IDENTIFIER, 5, "SM_Quad", &section);

        let model = parse(file).unwrap();
        assert_eq!(model.header.object_name, "SM_Quad");
        assert!(!model.header.is_compressed());
        assert_eq!(model.lods.len(), 1);

        let lod = &model.lods[0];
        assert_eq!(lod.name, "LOD0");
        assert_eq!(lod.positions.len(), 4);
        assert_eq!(lod.indices.len(), 6);
        assert_eq!(lod.normals.len(), 4);
        assert_eq!(lod.triangle_count(), 2);
        assert_eq!(lod.uv_channel_count(), 1);
        assert_eq!(lod.vertex_colors.len(), 1);
        assert_eq!(lod.vertex_colors[0].name, "COL0");
        assert_eq!(lod.materials.len(), 1);
    }

    #[test]
    fn counts_match_for_every_supported_version() {
        for version in 1u8..=5 {
            let section = lods_section(&[lod_entry("LOD0", &quad_chunks())]);
            let file = container_raw(MODEL_IDENTIFIER, version, "SM_Quad", &section);

            let model = parse(file).unwrap();
            assert_eq!(model.header.file_version, version);
            assert_eq!(model.lods[0].positions.len(), 4);
            assert_eq!(model.lods[0].indices.len(), 6);
            assert_eq!(model.lods[0].normals.len(), 4);
        }
    }

    #[test]
    fn parses_zstd_container() {
        let section = lods_section(&[lod_entry("LOD0", &quad_chunks())]);
        let file = container_compressed(5, "SM_Quad", &CompressionMethod::Zstd, &section, None);

        let model = parse(file).unwrap();
        assert!(model.header.is_compressed());
        assert_eq!(
            model.header.compression.as_ref().unwrap().method,
            "ZSTD"
        );
        assert_eq!(model.lods[0].positions.len(), 4);
    }

    #[test]
    fn parses_gzip_container() {
        let section = lods_section(&[lod_entry("LOD0", &quad_chunks())]);
        let file = container_compressed(5, "SM_Quad", &CompressionMethod::Gzip, &section, None);

        let model = parse(file).unwrap();
        assert_eq!(model.lods[0].positions.len(), 4);
    }

    #[test]
    fn decompression_size_lie_of_one_byte_fails() {
        let section = lods_section(&[lod_entry("LOD0", &quad_chunks())]);
        let file = container_compressed(
            5,
            "SM_Quad",
            &CompressionMethod::Zstd,
            &section,
            Some(section.len() + 1),
        );

        let err = parse(file).unwrap_err();
        match err {
            ParseError::DecompressionSizeMismatch { expected, actual } => {
                assert_eq!(expected, section.len() + 1);
                assert_eq!(actual, section.len());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn corrupted_magic_fails_without_reading_header_fields() {
        let section = lods_section(&[]);
        let mut file = container_raw(MODEL_IDENTIFIER, 5, "SM_Quad", &section);
        file[0] ^= 0x01;

        let err = parse(file).unwrap_err();
        assert!(matches!(err, ParseError::InvalidMagic { .. }));

        // A file that ends right after a corrupted magic still classifies
        // as InvalidMagic: no header field read is attempted.
        let mut stub = UEF_MAGIC.to_vec();
        stub[7] ^= 0x01;
        let err = parse(stub).unwrap_err();
        assert!(matches!(err, ParseError::InvalidMagic { .. }));
    }

    #[test]
    fn unsupported_version_fails() {
        let section = lods_section(&[]);
        let file = container_raw(MODEL_IDENTIFIER, 9, "SM_Quad", &section);

        let err = parse(file).unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnsupportedVersion { version: 9, .. }
        ));
    }

    #[test]
    fn unsupported_compression_name_fails() {
        let mut file = Vec::new();
        file.extend_from_slice(UEF_MAGIC);
        push_string(&mut file, MODEL_IDENTIFIER);
        file.push(5);
        push_string(&mut file, "SM_Quad");
        file.push(1);
        push_string(&mut file, "LZMA");
        push_i32(&mut file, 64);
        push_i32(&mut file, 4);
        file.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);

        let err = parse(file).unwrap_err();
        match err {
            ParseError::UnsupportedCompression { method } => assert_eq!(method, "LZMA"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_model_identifier_yields_empty_model() {
        // Payload bytes are never section-parsed for non-model identifiers.
        let file = container_raw(ANIM_IDENTIFIER, 5, "AS_Run", b"not sections at all");

        let model = parse(file).unwrap();
        assert_eq!(model.header.identifier, ANIM_IDENTIFIER);
        assert!(model.lods.is_empty());
        assert!(model.skeleton.is_none());
    }

    #[test]
    fn declared_size_above_memory_limit_is_rejected() {
        let section = lods_section(&[]);
        let file =
            container_compressed(5, "SM_Quad", &CompressionMethod::Zstd, &section, None);

        let options = ParseOptions {
            decompression_memory_limit: 1,
            ..Default::default()
        };
        let err = UeModelParser::new()
            .parse_with_options(Cursor::new(file), &options, None)
            .unwrap_err();
        assert!(matches!(err, ParseError::InvalidData { .. }));
    }
}

// ==================== section and chunk tests ====================

mod sections {
    use super::*;

    #[test]
    fn zero_lod_model_parses_to_empty_list() {
        let section = lods_section(&[]);
        let file = container_raw(MODEL_IDENTIFIER, 5, "SM_Empty", &section);

        let model = parse(file).unwrap();
        assert!(model.lods.is_empty());
    }

    #[test]
    fn unknown_section_between_lods_sections_is_skipped_exactly() {
        let first = lods_section(&[lod_entry("LOD0", &quad_chunks())]);
        // Body bytes deliberately resemble a section header to prove the
        // skip is length-driven, not content-driven.
        let mut junk_body = Vec::new();
        push_string(&mut junk_body, "LODS");
        push_i32(&mut junk_body, 77);
        junk_body.extend_from_slice(&[0xAB; 13]);
        let junk = chunk("CONVEXCOLLISION", 3, &junk_body);
        let second = lods_section(&[lod_entry("LOD1", &quad_chunks())]);

        let mut payload = Vec::new();
        payload.extend_from_slice(&first);
        payload.extend_from_slice(&junk);
        payload.extend_from_slice(&second);
        let file = container_raw(MODEL_IDENTIFIER, 5, "SM_Quad", &payload);

        let model = parse(file).unwrap();
        assert_eq!(model.lods.len(), 2);
        assert_eq!(model.lods[0].name, "LOD0");
        assert_eq!(model.lods[1].name, "LOD1");
        assert_eq!(model.lods[1].positions.len(), 4);
    }

    #[test]
    fn skeleton_section_is_recognized_but_skipped() {
        let skeleton = chunk("SKELETON", 2, &[0x00; 24]);
        let lods = lods_section(&[lod_entry("LOD0", &quad_chunks())]);

        let mut payload = Vec::new();
        payload.extend_from_slice(&skeleton);
        payload.extend_from_slice(&lods);
        let file = container_raw(MODEL_IDENTIFIER, 5, "SK_Mesh", &payload);

        let model = parse(file).unwrap();
        assert!(model.skeleton.is_none());
        assert_eq!(model.lods.len(), 1);
    }

    #[test]
    fn truncated_section_body_fails_typed() {
        let mut payload = Vec::new();
        push_string(&mut payload, "LODS");
        push_i32(&mut payload, 1);
        push_i32(&mut payload, 4096); // declares far more than is present
        let file = container_raw(MODEL_IDENTIFIER, 5, "SM_Trunc", &payload);

        let err = parse(file).unwrap_err();
        assert!(matches!(err, ParseError::BufferOverflow { .. }));
    }
}

mod chunks {
    use super::*;

    #[test]
    fn normals_reorder_wxyz_to_xyzw() {
        let mut normals = Vec::new();
        // One vertex, serialized W=-1, X=0.1, Y=0.2, Z=0.3
        push_f32(&mut normals, -1.0);
        push_f32(&mut normals, 0.1);
        push_f32(&mut normals, 0.2);
        push_f32(&mut normals, 0.3);

        let section = lods_section(&[lod_entry("LOD0", &[chunk("NORMALS", 1, &normals)])]);
        let file = container_raw(MODEL_IDENTIFIER, 5, "SM_N", &section);

        let model = parse(file).unwrap();
        let normal = model.lods[0].normals[0];
        assert_eq!(normal.x, 0.1);
        assert_eq!(normal.y, 0.2);
        assert_eq!(normal.z, 0.3);
        assert_eq!(normal.w, -1.0);

        let directions: Vec<Vec3> = model.lods[0].normal_directions().collect();
        assert_eq!(directions[0], Vec3::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn material_ranges_assign_faces() {
        // 30 triangles, ranges starting at faces 0, 10, 25
        let mut indices = Vec::new();
        for i in 0..90i32 {
            push_i32(&mut indices, i % 32);
        }

        let mut materials = Vec::new();
        for (name, first, count) in [("M_A", 0, 10), ("M_B", 10, 15), ("M_C", 25, 5)] {
            push_string(&mut materials, name);
            push_i32(&mut materials, first);
            push_i32(&mut materials, count);
        }

        let section = lods_section(&[lod_entry(
            "LOD0",
            &[chunk("INDICES", 90, &indices), chunk("MATERIALS", 3, &materials)],
        )]);
        let file = container_raw(MODEL_IDENTIFIER, 5, "SM_M", &section);

        let model = parse(file).unwrap();
        let lod = &model.lods[0];
        assert_eq!(lod.triangle_count(), 30);

        let assignment = lod.face_material_assignment();
        for face in 0..10 {
            assert_eq!(assignment[face], 0, "face {face}");
        }
        for face in 10..25 {
            assert_eq!(assignment[face], 1, "face {face}");
        }
        for face in 25..30 {
            assert_eq!(assignment[face], 2, "face {face}");
        }
    }

    #[test]
    fn weights_decode_at_packed_stride() {
        // Two 10-byte records: bone u16, vertex i32, weight f32
        let mut weights = Vec::new();
        weights.extend_from_slice(&7u16.to_le_bytes());
        push_i32(&mut weights, 42);
        push_f32(&mut weights, 0.75);
        weights.extend_from_slice(&8u16.to_le_bytes());
        push_i32(&mut weights, 42);
        push_f32(&mut weights, 0.25);
        assert_eq!(weights.len(), 20);

        let section = lods_section(&[lod_entry("LOD0", &[chunk("WEIGHTS", 2, &weights)])]);
        let file = container_raw(MODEL_IDENTIFIER, 5, "SK_W", &section);

        let model = parse(file).unwrap();
        let lod = &model.lods[0];
        assert!(lod.has_weights());
        assert_eq!(lod.weights[0].bone_index, 7);
        assert_eq!(lod.weights[0].vertex_index, 42);
        assert_eq!(lod.weights[0].weight, 0.75);
        assert_eq!(lod.weights[1].bone_index, 8);

        let grouped = lod.weights_by_vertex();
        assert_eq!(grouped[&42].len(), 2);
    }

    #[test]
    fn morph_targets_decode() {
        let mut morphs = Vec::new();
        push_string(&mut morphs, "Smile");
        push_i32(&mut morphs, 2); // delta count
        for (delta, index) in [(0.5f32, 3i32), (-0.5, 9)] {
            push_f32(&mut morphs, delta);
            push_f32(&mut morphs, 0.0);
            push_f32(&mut morphs, 0.0);
            push_f32(&mut morphs, 0.0);
            push_f32(&mut morphs, 0.0);
            push_f32(&mut morphs, 1.0);
            push_i32(&mut morphs, index);
        }

        let section = lods_section(&[lod_entry("LOD0", &[chunk("MORPHTARGETS", 1, &morphs)])]);
        let file = container_raw(MODEL_IDENTIFIER, 5, "SK_Face", &section);

        let model = parse(file).unwrap();
        assert!(model.has_morph_targets());
        let morph = &model.lods[0].morph_targets[0];
        assert_eq!(morph.name, "Smile");
        assert_eq!(morph.deltas.len(), 2);
        assert_eq!(morph.deltas[0].position.x, 0.5);
        assert_eq!(morph.deltas[0].vertex_index, 3);
        assert_eq!(morph.deltas[1].position.x, -0.5);
        assert_eq!(morph.deltas[1].normal.z, 1.0);
        assert_eq!(morph.deltas[1].vertex_index, 9);
    }

    #[test]
    fn multiple_texcoord_channels_decode() {
        let mut texcoords = Vec::new();
        for channel in 0..2 {
            push_i32(&mut texcoords, 3);
            for i in 0..3 {
                push_f32(&mut texcoords, channel as f32);
                push_f32(&mut texcoords, i as f32);
            }
        }

        let section = lods_section(&[lod_entry("LOD0", &[chunk("TEXCOORDS", 2, &texcoords)])]);
        let file = container_raw(MODEL_IDENTIFIER, 5, "SM_UV", &section);

        let model = parse(file).unwrap();
        let lod = &model.lods[0];
        assert_eq!(lod.uv_channel_count(), 2);
        assert_eq!(lod.uv_channels[0].len(), 3);
        assert_eq!(lod.uv_channels[1][2], Vec2::new(1.0, 2.0));
    }

    #[test]
    fn tangents_and_unknown_chunks_are_skipped() {
        let tangents = chunk("TANGENTS", 4, &[0x11; 48]);
        let unknown = chunk("BINORMALSIGNS", 4, &[0x22; 16]);

        let mut vertices = Vec::new();
        for p in quad_positions() {
            push_f32(&mut vertices, p.x);
            push_f32(&mut vertices, p.y);
            push_f32(&mut vertices, p.z);
        }

        let section = lods_section(&[lod_entry(
            "LOD0",
            &[tangents, unknown, chunk("VERTICES", 4, &vertices)],
        )]);
        let file = container_raw(MODEL_IDENTIFIER, 5, "SM_T", &section);

        let model = parse(file).unwrap();
        assert_eq!(model.lods[0].positions.len(), 4);
    }

    #[test]
    fn oversized_count_fails_typed() {
        let mut vertices = Vec::new();
        push_f32(&mut vertices, 0.0);
        push_f32(&mut vertices, 0.0);
        push_f32(&mut vertices, 0.0);

        // Count claims 1000 vertices; only one is present.
        let mut lying = Vec::new();
        push_string(&mut lying, "VERTICES");
        push_i32(&mut lying, 1000);
        push_i32(&mut lying, vertices.len() as i32);
        lying.extend_from_slice(&vertices);

        let mut entry = Vec::new();
        push_string(&mut entry, "LOD0");
        push_i32(&mut entry, lying.len() as i32);
        entry.extend_from_slice(&lying);

        let section = lods_section(&[entry]);
        let file = container_raw(MODEL_IDENTIFIER, 5, "SM_Bad", &section);

        let err = parse(file).unwrap_err();
        assert!(matches!(err, ParseError::BufferOverflow { .. }));
    }
}

// ==================== size-consistency tests ====================

mod consistency {
    use super::*;

    /// A VERTICES chunk whose declared size is four bytes larger than its
    /// actual encoding, followed by an INDICES chunk.
    fn lying_lod_section() -> Vec<u8> {
        let mut vertices = Vec::new();
        push_f32(&mut vertices, 1.0);
        push_f32(&mut vertices, 2.0);
        push_f32(&mut vertices, 3.0);

        let mut lying = Vec::new();
        push_string(&mut lying, "VERTICES");
        push_i32(&mut lying, 1);
        push_i32(&mut lying, (vertices.len() + 4) as i32);
        lying.extend_from_slice(&vertices);
        lying.extend_from_slice(&[0u8; 4]); // padding the decoder ignores

        let mut indices = Vec::new();
        for i in [0i32, 0, 0] {
            push_i32(&mut indices, i);
        }
        let indices_chunk = chunk("INDICES", 3, &indices);

        let mut entry = Vec::new();
        push_string(&mut entry, "LOD0");
        push_i32(&mut entry, (lying.len() + indices_chunk.len()) as i32);
        entry.extend_from_slice(&lying);
        entry.extend_from_slice(&indices_chunk);

        lods_section(&[entry])
    }

    #[test]
    fn lenient_mode_resynchronizes_to_declared_boundary() {
        let file = container_raw(MODEL_IDENTIFIER, 5, "SM_Lie", &lying_lod_section());

        let model = parse(file).unwrap();
        let lod = &model.lods[0];
        assert_eq!(lod.positions.len(), 1);
        assert_eq!(lod.positions[0], Vec3::new(1.0, 2.0, 3.0));
        // The chunk after the lying one still decodes: the declared size
        // stayed authoritative.
        assert_eq!(lod.indices.len(), 3);
    }

    #[test]
    fn strict_mode_reports_the_mismatch() {
        let file = container_raw(MODEL_IDENTIFIER, 5, "SM_Lie", &lying_lod_section());

        let err = parse_strict(file).unwrap_err();
        match err {
            ParseError::ChunkSizeMismatch {
                chunk,
                declared,
                consumed,
            } => {
                assert_eq!(chunk, "VERTICES");
                assert_eq!(declared, 16);
                assert_eq!(consumed, 12);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn strict_mode_accepts_honest_files() {
        let section = lods_section(&[lod_entry("LOD0", &quad_chunks())]);
        let file = container_raw(MODEL_IDENTIFIER, 5, "SM_Quad", &section);

        let model = parse_strict(file).unwrap();
        assert_eq!(model.lods[0].positions.len(), 4);
    }
}
