//! Synthetic LDraw library shared by the integration tests.
//!
//! Layout mirrors a real installation: `ldraw/{parts,p}` for the official
//! library and `ldrawunf/{parts,p}` for the unofficial supplement. Part
//! structures are chosen so the totals match the real parts of the same
//! number.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use studcountlib::LibraryConfig;
use tempfile::{tempdir, TempDir};

pub struct Fixture {
    _temp: TempDir,
    pub ldraw: PathBuf,
    pub unofficial: PathBuf,
}

impl Fixture {
    pub fn official_config(&self) -> LibraryConfig {
        LibraryConfig::from_ldraw_root(&self.ldraw)
    }

    pub fn full_config(&self) -> LibraryConfig {
        self.official_config().unofficial_root(&self.unofficial)
    }

    pub fn part(&self, name: &str) -> PathBuf {
        self.ldraw.join("parts").join(name)
    }

    pub fn primitive(&self, name: &str) -> PathBuf {
        self.ldraw.join("p").join(name)
    }
}

pub fn write(root: &Path, rel: &str, lines: &[String]) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, lines.join("\r\n")).unwrap();
}

pub fn header(title: &str) -> String {
    format!("0 {title}")
}

pub fn sub(name: &str) -> String {
    format!("1 16 0 0 0 1 0 0 0 1 0 0 0 1 {name}")
}

fn subs(name: &str, times: usize) -> Vec<String> {
    (0..times).map(|_| sub(name)).collect()
}

fn doc(title: &str, refs: &[(&str, usize)]) -> Vec<String> {
    let mut lines = vec![header(title), "0 BFC CERTIFY CCW".to_string(), String::new()];
    for (name, times) in refs {
        lines.extend(subs(name, *times));
    }
    lines.push("4 16 1 0 1 -1 0 1 -1 0 -1 1 0 -1".to_string());
    lines
}

pub fn create_fixture() -> Fixture {
    let temp = tempdir().unwrap();
    let ldraw = temp.path().join("ldraw");
    let unofficial = temp.path().join("ldrawunf");
    let parts = ldraw.join("parts");
    let prims = ldraw.join("p");
    let unf_parts = unofficial.join("parts");
    let unf_prims = unofficial.join("p");

    // Primitives
    write(&prims, "4-4cyli.dat", &doc("Cylinder 1.0", &[]));
    write(&prims, "4-4disc.dat", &doc("Disc 1.0", &[]));
    write(&prims, "box4.dat", &doc("Box with 4 Faces", &[]));
    write(&prims, "box5.dat", &doc("Box with 5 Faces", &[]));
    write(&prims, "stud.dat", &doc("Stud", &[("4-4cyli.dat", 1), ("4-4disc.dat", 1)]));
    write(&prims, "stud2a.dat", &doc("Stud Open without Base Edges", &[("4-4cyli.dat", 2)]));
    write(&prims, "stud3.dat", &doc("Stud Tube Solid", &[("4-4cyli.dat", 1)]));
    write(&prims, "stud4.dat", &doc("Stud Tube Open", &[("4-4cyli.dat", 2)]));
    write(&prims, "stud4s.dat", &doc("Stud Tube Open Sloped", &[("4-4cyli.dat", 1)]));
    write(&prims, "48/4-4cyli.dat", &doc("Hi-Res Cylinder 1.0", &[]));

    // 3070b: tile, no studs
    write(&parts, "s/3070bs01.dat", &doc("~Tile  1 x  1", &[("box4.dat", 2), ("box5.dat", 1)]));
    write(&parts, "3070b.dat", &doc("Tile  1 x  1 with Groove", &[("s\\3070bs01.dat", 1)]));

    // 3024: plate 1 x 1
    write(&parts, "3024.dat", &doc("Plate  1 x  1", &[("box5.dat", 1), ("stud.dat", 1)]));

    // 912: 76 top studs through a shared subpart
    write(&parts, "s/912s01.dat", &doc("~Baseplate Section", &[("stud.dat", 19), ("box5.dat", 1)]));
    write(
        &parts,
        "912.dat",
        &doc("Baseplate  2 x 38", &[("s\\912s01.dat", 4), ("48\\4-4cyli.dat", 1)]),
    );

    // 71427c01: 16 top studs, 3 stud rings, one sloped ring that is ignored
    write(&parts, "s/71427s01.dat", &doc("~Motor Shell", &[("STUD2A.DAT", 8)]));
    write(
        &parts,
        "71427c01.dat",
        &doc(
            "Electric Motor 4.5V Type I",
            &[("s\\71427s01.dat", 2), ("stud4.dat", 3), ("stud4s.dat", 2)],
        ),
    );

    // 32531: 16 top studs, 12 underside studs
    write(&parts, "s/32531s01.dat", &doc("~Brick Section", &[("stud.dat", 4), ("stud3.dat", 3)]));
    write(&parts, "32531.dat", &doc("Technic Brick 4 x 6", &[("S\\32531S01.DAT", 4)]));

    // 92947: official and unofficial copies differ
    write(&parts, "92947.dat", &doc("Brick  2 x  2 Round", &[("stud.dat", 4)]));
    write(&unf_parts, "92947.dat", &doc("Brick  2 x  2 Round (draft)", &[("stud.dat", 1)]));

    // Part whose subpart is not part of any library
    write(
        &parts,
        "4073p01.dat",
        &doc("Plate  1 x  1 Round", &[("stud.dat", 1), ("s\\4073p01s01.dat", 1)]),
    );

    // Unofficial supplement
    write(&unf_parts, "2048.dat", &doc("Bracket", &[("stud.dat", 1), ("stud26.dat", 12)]));
    write(&unf_parts, "s/3587s01.dat", &doc("~Hat Section", &[("stud.dat", 6)]));
    write(&unf_prims, "stud26.dat", &doc("Stud Tube Half", &[]));
    write(&unf_prims, "8/stud4hlf.dat", &doc("Lo-Res Stud Tube Half", &[]));
    write(&unf_prims, "48/1-4ring15.dat", &doc("Hi-Res Ring 15 x 0.25", &[]));

    Fixture {
        _temp: temp,
        ldraw,
        unofficial,
    }
}
