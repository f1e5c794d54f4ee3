#![cfg(test)]

use brine_protogen_compiler::{
    compile_module, translate_module, DeclarationSource, Grouping, ProtogenError, StringSource, TranslateOptions,
};
use brine_protogen_schema::SchemaError;

fn compile(text: &str, options: &TranslateOptions) -> Result<String, ProtogenError> {
    let source = StringSource::new().with_file("shop.go", text);
    let mut outputs = compile_module(&source, options)?;
    assert_eq!(outputs.len(), 1);
    Ok(outputs.remove(0).1)
}

#[test]
fn test_pointer_and_value_message_fields() {
    let input = r#"
package shop

type Widget struct {
    Name string
}

type X struct {
    Name string
    Ref  *Widget
}

type Y struct {
    Name   string
    Inline Widget
}
"#;

    let text = compile(input, &TranslateOptions::default()).expect("compile failed");
    assert_eq!(
        text,
        r#"syntax = "proto3";
package shop;

import "ext/ext.proto";

message Widget {
  string name = 1;
}

message X {
  string name = 1;
  optional Widget ref = 2;
}

message Y {
  string name = 1;
  Widget inline = 2 [(ext.nullable) = false];
}
"#
    );
}

#[test]
fn test_service_shaping() {
    let input = r#"
package shop

import (
    "context"
    "io"
)

type Widget struct {
    Name string
}

// WidgetService manages widgets.
type WidgetService interface {
    // Get fetches one widget.
    Get(ctx context.Context, id string) (*Widget, error)
    List(ctx context.Context) ([]Widget, error)
    Save(ctx context.Context, w Widget) error
    io.Closer
}
"#;

    let text = compile(input, &TranslateOptions::default()).expect("compile failed");

    assert!(text.contains(
        "// WidgetService manages widgets.
service Widget {
  // Get fetches one widget.
  rpc Get(WidgetGetOp) returns (Widget);

  rpc List(WidgetListOp) returns (WidgetList);
  rpc Save(Widget) returns (WidgetSaveResult);
}
"
    ));
    assert!(text.contains("message WidgetGetOp {\n  string id = 1;\n}\n"));
    assert!(text.contains(
        "message WidgetList {\n  repeated Widget widgets = 1 [(ext.nullable) = false];\n}\n"
    ));
    assert!(text.contains("message WidgetListOp {}\n"));
    assert!(text.contains("message WidgetSaveResult {}\n"));
    assert!(!text.contains("Closer"));
    assert!(!text.contains("ctx"));
}

#[test]
fn test_field_names_tags_and_extensions() {
    let input = r#"
package shop

import "time"

type Status string

type Base struct {
    ID string
}

// Order is a customer purchase.
type Order struct {
    Base
    // CustomerURL links to the customer page.
    CustomerURL string `json:"customerUrl"`
    XMLHttp     string
    internal    int
    State       Status `json:"state"`
    Quantity    int
    Placed      time.Time
    Timeout     time.Duration
    Payload     []byte
}
"#;

    let text = compile(input, &TranslateOptions::new("^Order$").unwrap()).expect("compile failed");
    assert_eq!(
        text,
        r#"syntax = "proto3";
package shop;

import "ext/ext.proto";
import "google/protobuf/timestamp.proto";

// Order is a customer purchase.
message Order {
  Base base = 1 [(ext.embed) = true, (ext.nullable) = false];

  // CustomerURL links to the customer page.
  string customer_url = 2 [(ext.moretags) = "json:\"customerUrl\""];

  string xml_http = 3 [(ext.customname) = "XMLHttp"];
  string state = 4 [(ext.casttype) = "Status"];
  int64 quantity = 5 [(ext.casttype) = "int"];
  google.protobuf.Timestamp placed = 6 [(ext.nullable) = false];
  int64 timeout = 7 [(ext.casttype) = "time.Duration"];
  bytes payload = 8;
}
"#
    );
}

#[test]
fn test_unmapped_types_leave_a_placeholder() {
    let input = r#"
package shop

type Invoice struct {
    Total  decimal.Decimal
    Lines  map[string]int
    Notify chan string
}
"#;

    let text = compile(input, &TranslateOptions::default()).expect("compile failed");
    assert!(text.contains("UNRESOLVED.decimal.Decimal total = 1;"));
    assert!(text.contains("UNRESOLVED.map[string]int lines = 2;"));
    assert!(text.contains("UNRESOLVED.chan string notify = 3;"));
}

#[test]
fn test_instantiated_generics_leave_a_placeholder() {
    let input = r#"
package shop

import "sync/atomic"

type Config struct {
    Name string
}

type Holder struct {
    Name    string
    Current atomic.Pointer[Config]
    Ready   bool
}
"#;

    let text = compile(input, &TranslateOptions::default()).expect("compile failed");
    assert!(text.contains("UNRESOLVED.atomic.Pointer[Config] current = 2;"));
    assert!(text.contains("bool ready = 3;"));
    assert!(text.contains("message Config {"));
}

#[test]
fn test_type_set_interfaces_are_skipped() {
    let input = r#"
package shop

type Number interface {
    ~int | ~float64
}

type Widget struct {
    Name string
}
"#;

    let text = compile(input, &TranslateOptions::default()).expect("compile failed");
    assert!(text.contains("message Widget {"));
    assert!(!text.contains("service Number"));
}

#[test]
fn test_interface_fields_are_not_message_references() {
    let input = r#"
package shop

type Store interface {
    Ping()
}

type Holder struct {
    Backend Store
}
"#;

    let text = compile(input, &TranslateOptions::default()).expect("compile failed");
    assert!(text.contains("UNRESOLVED.shop.Store backend = 1;"));
    assert!(!text.contains("Store backend = 1 [(ext.nullable) = false]"));
    assert!(!text.contains("message Store {"));
}

#[test]
fn test_conflicting_wrapper_is_fatal() {
    let input = r#"
package shop

import "context"

type StoreGetOp struct {
    Name string
}

type StoreService interface {
    Get(ctx context.Context, id int64) error
}
"#;

    let err = compile(input, &TranslateOptions::default()).unwrap_err();
    match err {
        ProtogenError::Schema {
            declaration,
            source: SchemaError::ConflictingMessage { name, .. },
        } => {
            assert_eq!(declaration, "StoreGetOp");
            assert_eq!(name, "StoreGetOp");
        }
        other => panic!("expected a conflicting message, got {:?}", other),
    }
}

#[test]
fn test_identical_wrapper_is_a_no_op() {
    let input = r#"
package shop

import "context"

type Widget struct {
    Name string
}

type WidgetList struct {
    Widgets []Widget
}

type Catalog interface {
    Featured(ctx context.Context) ([]Widget, error)
    Clearance(ctx context.Context) ([]Widget, error)
}
"#;

    let text = compile(input, &TranslateOptions::default()).expect("compile failed");
    assert_eq!(text.matches("message WidgetList {").count(), 1);
    assert!(text.contains("rpc Featured(CatalogFeaturedOp) returns (WidgetList);"));
    assert!(text.contains("rpc Clearance(CatalogClearanceOp) returns (WidgetList);"));
}

#[test]
fn test_errors_and_test_doubles_are_excluded() {
    let source = StringSource::new()
        .with_file(
            "shop.go",
            "package shop\n\ntype NotFoundError struct { ID string }\ntype ErrLimit struct{}\ntype MockStore struct{}\ntype Store struct{}\n",
        )
        .with_file("shop_test.go", "package shop\n\ntype Fixture struct{}\n");
    let module = source.load().unwrap();
    let translation = translate_module(&module, &TranslateOptions::default()).unwrap();

    let names: Vec<&str> = translation["shop.proto"]
        .messages
        .iter()
        .map(|m| m.name.as_str())
        .collect();
    assert_eq!(names, vec!["Store"]);
}

#[test]
fn test_output_is_deterministic() {
    let widget = "package shop\n\n// Widget is for sale.\ntype Widget struct {\n\tName string `db:\"title\"`\n\tWhen time.Time\n}\n";
    let store = "package shop\n\ntype Store interface {\n\tFind(ctx context.Context, name string, limit int) ([]*Widget, int, error)\n}\n";
    let source = StringSource::new()
        .with_file("widget.go", widget)
        .with_file("store.go", store);

    for grouping in [Grouping::Single, Grouping::PerFile] {
        let options = TranslateOptions::default()
            .with_grouping(grouping)
            .with_option("go_package", "example.com/shop")
            .with_option("cc_enable_arenas", "true");
        let first = compile_module(&source, &options).unwrap();
        let second = compile_module(&source, &options).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_per_file_grouping() {
    let widget = "package shop\n\ntype Widget struct {\n\tName string\n}\n";
    let store = "package shop\n\nimport \"context\"\n\ntype Store interface {\n\tGet(ctx context.Context, id string) (*Widget, error)\n}\n";
    let source = StringSource::new()
        .with_file("widget.go", widget)
        .with_file("store.go", store);
    let options = TranslateOptions::default().with_grouping(Grouping::PerFile);

    let outputs = compile_module(&source, &options).unwrap();
    let names: Vec<&str> = outputs.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["store.proto", "widget.proto"]);

    let store_text = &outputs[0].1;
    assert!(store_text.contains("import \"widget.proto\";"));
    assert!(store_text.contains("rpc Get(StoreGetOp) returns (Widget);"));
    assert!(!outputs[1].1.contains("import"));
}
