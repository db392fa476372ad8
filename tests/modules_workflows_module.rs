use geoprep::ingest::ArtifactIngestor;
use geoprep::modules::{default_registry, WorkingDirs, MODULE_NAMES};
use geoprep::router::{DispatchError, Dispatcher};
use geoprep::toolkit::{ConverterBinaries, Toolkit};
use geoprep::workflow::{Expect, MessageId, Prompt};
use serde_json::{json, Value};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::{tempdir, TempDir};

fn write_script(path: &Path, body: &str) {
    fs::write(path, body).expect("write script");
    set_mode(path, 0o755);
}

fn set_mode(path: &Path, mode: u32) {
    let mut perms = fs::metadata(path).expect("metadata").permissions();
    perms.set_mode(mode);
    fs::set_permissions(path, perms).expect("chmod");
}

struct Project {
    _root: TempDir,
    input: PathBuf,
    output: PathBuf,
    gs_marker: PathBuf,
    dispatcher: Dispatcher,
}

impl Project {
    fn new() -> Self {
        let root = tempdir().expect("tempdir");
        let input = root.path().join("input");
        let output = root.path().join("output");
        let bin = root.path().join("bin");
        for dir in [&input, &output, &bin] {
            fs::create_dir(dir).expect("mkdir");
        }
        let gs_marker = root.path().join("gs-called");

        let gs = bin.join("gs");
        write_script(
            &gs,
            &format!(
                r#"#!/bin/sh
touch "{marker}"
out=""
for arg in "$@"; do
  case "$arg" in
    -sOutputFile=*) out="${{arg#-sOutputFile=}}"; : > "$out" ;;
    -*) ;;
    *) cat "$arg" >> "$out" || exit 3 ;;
  esac
done
"#,
                marker = gs_marker.display()
            ),
        );
        let ps2pdf = bin.join("ps2pdf");
        write_script(&ps2pdf, "#!/bin/sh\n{ echo 'PDF'; cat \"$1\"; } > \"$2\"\n");
        let enscript = bin.join("enscript");
        write_script(&enscript, "#!/bin/sh\ncat \"$3\" > \"$2\"\n");

        let toolkit = Toolkit::new(ConverterBinaries {
            ghostscript: gs.display().to_string(),
            ps2pdf: ps2pdf.display().to_string(),
            enscript: enscript.display().to_string(),
            timeout: Some(Duration::from_secs(10)),
        });
        let dirs = WorkingDirs::new(&input, &output);
        let dispatcher = Dispatcher::new(
            default_registry(&dirs, &toolkit),
            ArtifactIngestor::new(&input),
        );
        Self {
            _root: root,
            input,
            output,
            gs_marker,
            dispatcher,
        }
    }

    fn reply(&self, prompt: &Prompt, msg: Value) -> Result<Prompt, DispatchError> {
        self.dispatcher.dispatch_message(&prompt.message_id, msg)
    }

    fn draw(&self, prompt: &Prompt, geometry: Value) -> Result<Prompt, DispatchError> {
        self.dispatcher.dispatch_drawing(&prompt.message_id, &geometry)
    }
}

fn rectangle() -> Value {
    json!({
        "type": "Feature",
        "properties": {},
        "geometry": {
            "type": "Polygon",
            "coordinates": [[[7.0, 46.0], [7.5, 46.0], [7.5, 46.4], [7.0, 46.4], [7.0, 46.0]]]
        }
    })
}

fn sorted(mut names: Vec<String>) -> Vec<String> {
    names.sort();
    names
}

#[test]
fn every_module_is_registered() {
    let project = Project::new();
    let mut expected = MODULE_NAMES.to_vec();
    expected.sort_unstable();
    assert_eq!(project.dispatcher.registry().names(), expected);
    for name in MODULE_NAMES {
        let prompt = project.dispatcher.launch(name).expect(name);
        assert_eq!(prompt.message_id.module_name(), name);
    }
}

#[test]
fn add_location_records_a_named_bbox() {
    let project = Project::new();
    let start = project.dispatcher.launch("add_location").expect("launch");
    assert_eq!(start.expect, Expect::Drawing);

    let ask_name = project.draw(&start, rectangle()).expect("bbox");
    assert_eq!(ask_name.message_id, MessageId::parse("add_location.name"));

    let done = project.reply(&ask_name, json!("lake_geneva")).expect("name");
    assert!(done.done);
    assert_eq!(done.results, vec!["locations/lake_geneva.json"]);

    let record: Value = serde_json::from_slice(
        &fs::read(project.input.join("locations/lake_geneva.json")).expect("record"),
    )
    .expect("json");
    assert_eq!(record["name"], "lake_geneva");
    assert_eq!(record["bbox"]["west"], 7.0);
    assert_eq!(record["bbox"]["north"], 46.4);
}

#[test]
fn add_location_name_step_without_bbox_fails() {
    let project = Project::new();
    project.dispatcher.launch("add_location").expect("launch");
    let err = project
        .dispatcher
        .dispatch_message(&MessageId::parse("add_location.name"), json!("orphan"))
        .expect_err("missing bbox");
    assert_eq!(err.code(), "module_processing_error");
    assert!(err.to_string().contains("restart the module"), "{err}");
}

#[test]
fn add_map_moves_upload_into_maps() {
    let project = Project::new();
    let start = project.dispatcher.launch("add_map").expect("launch");
    assert!(matches!(start.expect, Expect::Upload { .. }));

    let ask_name = project
        .dispatcher
        .dispatch_upload(&start.message_id, "Roads.GeoJSON", br#"{"type":"FeatureCollection","features":[]}"#)
        .expect("upload");
    assert!(ask_name.message.contains("Roads"));

    let err = project.reply(&ask_name, json!("lines_osm")).expect_err("reserved");
    assert_eq!(err.code(), "module_processing_error");

    let done = project.reply(&ask_name, json!("roads")).expect("name");
    assert_eq!(done.results, vec!["maps/roads.geojson"]);
    assert!(project.input.join("maps/roads.geojson").exists());
    assert!(!project.input.join("Roads.GeoJSON").exists());
}

#[test]
fn add_map_rejects_unsupported_files() {
    let project = Project::new();
    let start = project.dispatcher.launch("add_map").expect("launch");
    let err = project
        .dispatcher
        .dispatch_upload(&start.message_id, "notes.docx", b"PK")
        .expect_err("unsupported");
    assert_eq!(err.code(), "module_processing_error");
    assert!(err.to_string().contains("notes.docx"), "{err}");
}

#[test]
fn selection_is_replaced_only_after_confirmation() {
    let project = Project::new();
    let selection = project.input.join("selection.geojson");
    fs::write(&selection, "previous").expect("seed");

    let start = project.dispatcher.launch("set_selection").expect("launch");
    let confirm = project.draw(&start, rectangle()).expect("draw");
    assert_eq!(
        confirm.expect,
        Expect::Choice {
            options: vec!["yes".to_string(), "no".to_string()]
        }
    );
    assert_eq!(fs::read_to_string(&selection).expect("unchanged"), "previous");

    let again = project.reply(&confirm, json!("no")).expect("decline");
    assert_eq!(again.message_id, MessageId::parse("set_selection.draw"));
    assert_eq!(fs::read_to_string(&selection).expect("unchanged"), "previous");

    let confirm = project.draw(&again, rectangle()).expect("draw again");
    let done = project.reply(&confirm, json!("YES")).expect("accept");
    assert!(done.done);
    let stored: Value =
        serde_json::from_slice(&fs::read(&selection).expect("selection")).expect("json");
    assert_eq!(stored, rectangle());
}

#[test]
fn resolution_is_validated_and_persisted() {
    let project = Project::new();
    let start = project.dispatcher.launch("set_resolution").expect("launch");

    for bad in [json!(0), json!(-5), json!("fine"), json!(20000)] {
        let err = project.reply(&start, bad.clone()).expect_err("invalid");
        assert_eq!(err.code(), "module_processing_error", "{bad}");
    }

    let done = project.reply(&start, json!("12.5")).expect("value");
    assert!(done.done);
    let stored: Value = serde_json::from_slice(
        &fs::read(project.input.join("resolution.json")).expect("resolution"),
    )
    .expect("json");
    assert_eq!(stored, json!({ "metres": 12.5 }));

    let relaunch = project.dispatcher.launch("set_resolution").expect("relaunch");
    assert!(relaunch.message.contains("currently 12.5"), "{}", relaunch.message);
}

#[test]
fn layer_report_lists_only_user_layers() {
    let project = Project::new();
    fs::create_dir(project.input.join("maps")).expect("maps");
    for name in ["roads", "lines_osm", "selection"] {
        fs::write(
            project.input.join(format!("maps/{name}.geojson")),
            rectangle().to_string(),
        )
        .expect("layer");
    }
    fs::write(project.input.join("drawing.geojson"), "{}").expect("drawing");

    let start = project.dispatcher.launch("module_1").expect("launch");
    assert_eq!(
        start.expect,
        Expect::Choice {
            options: vec!["roads".to_string()]
        }
    );

    let done = project.reply(&start, json!("roads")).expect("report");
    assert_eq!(
        sorted(done.results),
        vec!["roads_report.pdf", "roads_report.txt"]
    );
    let pdf = fs::read_to_string(project.output.join("roads_report.pdf")).expect("pdf");
    assert!(pdf.starts_with("PDF\nLayer report: roads"), "{pdf}");
    assert!(pdf.contains("Features: 1"), "{pdf}");
}

#[test]
fn bundle_merges_reports_in_chosen_order() {
    let project = Project::new();
    fs::write(project.output.join("a_report.pdf"), "A\n").expect("a");
    fs::write(project.output.join("b_report.pdf"), "B\n").expect("b");

    let start = project.dispatcher.launch("module_2").expect("launch");
    assert_eq!(
        start.expect,
        Expect::Choice {
            options: vec!["a_report.pdf".to_string(), "b_report.pdf".to_string()]
        }
    );

    let done = project
        .reply(&start, json!(["b_report.pdf", "a_report.pdf"]))
        .expect("bundle");
    assert_eq!(
        fs::read_to_string(project.output.join("report_bundle.pdf")).expect("bundle"),
        "B\nA\n"
    );
    assert_eq!(
        sorted(done.results),
        vec!["a_report.pdf", "b_report.pdf", "report_bundle.pdf"]
    );

    let relaunch = project.dispatcher.launch("module_2").expect("relaunch");
    assert!(matches!(relaunch.expect, Expect::Choice { ref options } if options.len() == 2));
}

#[test]
fn bundle_into_read_only_output_never_runs_ghostscript() {
    let project = Project::new();
    fs::write(project.output.join("a_report.pdf"), "A\n").expect("a");
    set_mode(&project.output, 0o555);

    let launch = project.dispatcher.launch("module_2");
    let reply = project
        .dispatcher
        .dispatch_message(&MessageId::parse("module_2.order"), json!("all"));
    let entries = fs::read_dir(&project.output).expect("read dir").count();
    set_mode(&project.output, 0o755);

    for result in [launch, reply] {
        let err = result.expect_err("not writable");
        assert!(matches!(err, DispatchError::DirectoryNotWritable { .. }), "{err:?}");
        assert!(err.to_string().starts_with("Cannot launch module:"), "{err}");
    }
    assert_eq!(entries, 1);
    assert!(!project.gs_marker.exists());
}

#[test]
fn unknown_step_is_a_module_failure() {
    let project = Project::new();
    let err = project
        .dispatcher
        .dispatch_message(&MessageId::parse("set_resolution.bogus"), json!(1))
        .expect_err("unknown step");
    assert_eq!(err.code(), "module_processing_error");
    assert!(err.to_string().contains("no step `bogus`"), "{err}");
}
