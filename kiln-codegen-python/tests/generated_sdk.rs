//! End-to-end tests over the full generated SDK tree.

use kiln_codegen_python::Generator;
use kiln_config::Config;
use kiln_core::SourceTree;
use kiln_openapi::Document;

fn generate(doc_json: &str, config_toml: &str) -> SourceTree {
    let doc = Document::from_json(doc_json).expect("document should parse");
    let config: Config = config_toml.parse().expect("config should parse");
    Generator::new(&doc, &config)
        .generate()
        .expect("generation should succeed")
}

const DOC: &str = r##"{
    "paths": {
        "/v3/chat": {
            "post": {
                "summary": "Create a chat.",
                "requestBody": {"content": {"application/json": {"schema": {
                    "type": "object",
                    "required": ["bot_id"],
                    "properties": {
                        "bot_id": {"type": "string", "description": "Bot to converse with."},
                        "user_id": {"type": "string"}
                    }
                }}}},
                "responses": {"200": {"content": {"application/json": {"schema": {
                    "type": "object",
                    "properties": {
                        "code": {"type": "integer"},
                        "data": {"$ref": "#/components/schemas/Chat"}
                    }
                }}}}}
            }
        },
        "/v1/bots": {
            "get": {
                "summary": "List bots.",
                "parameters": [
                    {"name": "workspace_id", "in": "query", "required": true, "schema": {"type": "string"}},
                    {"name": "page_num", "in": "query", "schema": {"type": "integer"}},
                    {"name": "page_size", "in": "query", "schema": {"type": "integer"}}
                ],
                "responses": {"200": {"content": {"application/json": {"schema": {
                    "type": "object",
                    "properties": {
                        "data": {"type": "object", "properties": {
                            "total": {"type": "integer"},
                            "items": {"type": "array", "items": {"$ref": "#/components/schemas/Bot"}}
                        }}
                    }
                }}}}}
            }
        }
    },
    "components": {"schemas": {
        "Chat": {"type": "object", "required": ["id"], "properties": {
            "id": {"type": "string", "description": "Chat id."},
            "status": {"$ref": "#/components/schemas/ChatStatus"}
        }},
        "ChatStatus": {"type": "string", "enum": ["created", "completed"]},
        "Bot": {"type": "object", "properties": {
            "bot_id": {"type": "string"},
            "name": {"type": "string"}
        }}
    }}
}"##;

const CONFIG: &str = r#"
    [sdk]
    package = "acme"
    client_class = "AcmeClient"
    base_url = "https://api.acme.dev"

    [[packages]]
    name = "chat"

    [[packages]]
    name = "bots"

    [[mappings]]
    path = "/v3/chat"
    method = "post"
    sdk_methods = ["chat.create"]
    response_type = "Chat"

    [[mappings]]
    path = "/v1/bots"
    method = "get"
    sdk_methods = ["bots.list"]
    pagination = "number"
    response_type = "BotsPaged"
"#;

#[test]
fn test_generation_is_deterministic() {
    let first = generate(DOC, CONFIG);
    let second = generate(DOC, CONFIG);
    assert_eq!(first, second);
    assert_eq!(
        first.get("acme/chat/__init__.py"),
        second.get("acme/chat/__init__.py")
    );
}

#[test]
fn test_tree_shape() {
    let tree = generate(DOC, CONFIG);
    for path in [
        "acme/__init__.py",
        "acme/bots/__init__.py",
        "acme/chat/__init__.py",
        "acme/model.py",
        "acme/pagination.py",
        "acme/request.py",
        "acme/stream.py",
        "acme/util.py",
    ] {
        assert!(tree.contains(path), "missing {}", path);
    }
}

#[test]
fn test_chat_models_and_client() {
    let tree = generate(DOC, CONFIG);
    let chat = tree.get("acme/chat/__init__.py").unwrap();

    // Enum model precedes the class that references it.
    let status = chat.find("class ChatStatus(str, Enum):").unwrap();
    let model = chat.find("class Chat(BaseModel):").unwrap();
    assert!(status < model);
    assert!(chat.contains("CREATED = \"created\""));
    assert!(chat.contains("id: str"));
    assert!(chat.contains("\"\"\"Chat id.\"\"\""));
    assert!(chat.contains("status: Optional[ChatStatus] = None"));

    assert!(chat.contains("class ChatClient(object):"));
    assert!(chat.contains(
        "def create(self, *, bot_id: str, user_id: Optional[str] = None, **kwargs) -> Chat:"
    ));
    assert!(chat.contains(":param bot_id: Bot to converse with."));
    assert!(chat.contains("url = f\"{self._base_url}/v3/chat\""));
    assert!(chat.contains("body = remove_none_values({"));
    assert!(chat.contains(
        "return self._requester.request(\"post\", url, False, Chat, headers=headers, body=body)"
    ));

    assert!(chat.contains("class AsyncChatClient(object):"));
    assert!(chat.contains("async def create("));
    assert!(chat.contains("return await self._requester.arequest("));
}

#[test]
fn test_import_minimization() {
    let tree = generate(DOC, CONFIG);
    let chat = tree.get("acme/chat/__init__.py").unwrap();

    assert!(chat.contains("from typing import Optional\n"));
    assert!(
        !chat.contains("from typing import Any"),
        "unused typing symbols must not be imported"
    );
    assert!(chat.contains("from enum import Enum\n"));
    assert!(chat.contains("from acme.model import BaseModel\n"));
    assert!(chat.contains("from acme.request import Requester\n"));
    assert!(chat.contains("from acme.util import remove_none_values\n"));
    assert!(!chat.contains("from acme.stream import"));
    assert!(!chat.contains("from acme.pagination import"));
}

#[test]
fn test_paged_response_synthesis() {
    let tree = generate(DOC, CONFIG);
    let bots = tree.get("acme/bots/__init__.py").unwrap();

    assert!(bots.contains("class Bot(BaseModel):"));
    assert!(bots.contains("class BotsPaged(BaseModel, NumberPagedResponse[Bot]):"));
    assert!(bots.contains("total: Optional[int] = None"));
    assert!(bots.contains("items: List[Bot]"));
    assert!(bots.contains("def get_total(self) -> Optional[int]:"));
    assert!(bots.contains("return self.total"));
    assert!(bots.contains("def get_has_more(self) -> Optional[bool]:"));
    assert!(bots.contains("return None"));
    assert!(bots.contains("def get_items(self) -> List[Bot]:"));
    assert!(bots.contains("from acme.pagination import NumberPagedResponse\n"));

    // Paging params sort last; pagination suppresses the document text.
    assert!(bots.contains("def list(self, *, workspace_id: str, page_num: Optional[int] = None, page_size: Optional[int] = None, **kwargs) -> BotsPaged:"));
    assert!(!bots.contains("List bots."));
}

#[test]
fn test_root_aggregation() {
    let tree = generate(DOC, CONFIG);
    let root = tree.get("acme/__init__.py").unwrap();

    assert!(root.contains("from acme.bots import"));
    assert!(root.contains("from acme.chat import"));
    assert!(root.contains("__all__ = ["));
    for name in ["AcmeClient", "AsyncAcmeClient", "Bot", "BotsPaged", "Chat", "ChatClient"] {
        assert!(root.contains(&format!("\"{}\",", name)), "missing export {}", name);
    }

    assert!(root.contains(
        "def __init__(self, base_url: str = \"https://api.acme.dev\", requester: Optional[Requester] = None):"
    ));
    // Curated property order: bots before chat.
    let bots = root.find("def bots(self)").unwrap();
    let chat = root.find("def chat(self)").unwrap();
    assert!(bots < chat);
    assert!(root.contains("self._bots = BotsClient(self._base_url, self._requester)"));
    assert!(root.contains("class AsyncAcmeClient(object):"));
}

#[test]
fn test_binder_dedup_in_output() {
    let config = r#"
        [sdk]
        package = "acme"

        [[packages]]
        name = "chat"

        [[mappings]]
        path = "/v3/chat"
        method = "post"
        sdk_methods = ["chat.create"]

        [[mappings]]
        path = "/v3/chat"
        method = "post"
        sdk_methods = ["chat.create"]
    "#;
    let tree = generate(DOC, config);
    let chat = tree.get("acme/chat/__init__.py").unwrap();
    assert!(chat.contains("def create("));
    assert!(chat.contains("def create_2("));
}

#[test]
fn test_rich_text_description_reaches_docstring() {
    let doc = r#"{
        "paths": {"/v1/tips": {"get": {
            "description": "{\"0\":{\"ops\":[{\"insert\":\"A\"},{\"insert\":\"B\"}]}}"
        }}}
    }"#;
    let config = r#"
        [sdk]
        package = "acme"

        [[packages]]
        name = "tips"

        [[mappings]]
        path = "/v1/tips"
        method = "get"
        sdk_methods = ["tips.list"]
    "#;
    let tree = generate(doc, config);
    let tips = tree.get("acme/tips/__init__.py").unwrap();
    assert!(tips.contains("\"\"\"A B\"\"\""));
    assert!(!tips.contains("ops"));
    assert!(!tips.contains("insert"));
}

#[test]
fn test_create_and_stream_delegate_to_private_create() {
    let config = r#"
        [sdk]
        package = "acme"

        [[packages]]
        name = "chat"
        sync_extra_methods = ['''
def _create(self, *, bot_id: str, user_id: Optional[str] = None, stream: bool = False, **kwargs) -> Chat:
    url = f"{self._base_url}/v3/chat"
    headers: Optional[dict] = kwargs.get("headers")
    body = remove_none_values({
        "bot_id": bot_id,
        "user_id": user_id,
        "stream": stream,
    })
    return self._requester.request("post", url, stream, Chat, headers=headers, body=body)
''']

        [[mappings]]
        path = "/v3/chat"
        method = "post"
        sdk_methods = ["chat.create"]
        response_type = "Chat"

        [[mappings]]
        path = "/v3/chat"
        method = "post"
        sdk_methods = ["chat.stream"]

        [mappings.streaming]
        wrap = true
        fields = ["event", "data"]
    "#;
    let tree = generate(DOC, config);
    let chat = tree.get("acme/chat/__init__.py").unwrap();

    assert!(chat.contains("def _create(self, *, bot_id: str"));
    assert!(chat.contains("return self._create(bot_id=bot_id, user_id=user_id, stream=False, **kwargs)"));
    assert!(chat.contains("return self._create(bot_id=bot_id, user_id=user_id, stream=True, **kwargs)"));

    // The async class has no private helper, so it keeps the full request.
    assert!(chat.contains("return AsyncStream(resp, fields=[\"event\", \"data\"])"));
}

#[test]
fn test_missing_mapping_fails_before_generation() {
    let config = r#"
        [sdk]
        package = "acme"

        [[packages]]
        name = "chat"

        [[mappings]]
        path = "/v3/gone"
        method = "post"
        sdk_methods = ["chat.create"]

        [[mappings]]
        path = "/v3/also-gone"
        method = "post"
        sdk_methods = ["chat.remove"]
    "#;
    let doc = Document::from_json(DOC).unwrap();
    let config: Config = config.parse().unwrap();
    let err = Generator::new(&doc, &config)
        .generate()
        .unwrap_err()
        .to_string();
    assert!(err.contains("/v3/gone"));
    assert!(err.contains("/v3/also-gone"), "all problems reported together");
}

#[test]
fn test_empty_generation_set_fails() {
    let doc = Document::from_json(r#"{"paths": {}}"#).unwrap();
    let config: Config = "[sdk]\npackage = \"acme\"".parse().unwrap();
    assert!(Generator::new(&doc, &config).generate().is_err());
}

#[test]
fn test_synthetic_operation_renders() {
    let config = r#"
        [sdk]
        package = "acme"

        [[packages]]
        name = "chat"

        [[mappings]]
        path = "/v3/chat/{conversation_id}/cancel"
        method = "post"
        sdk_methods = ["chat.cancel"]
        allow_missing = true
    "#;
    let tree = generate(DOC, config);
    let chat = tree.get("acme/chat/__init__.py").unwrap();
    assert!(chat.contains("def cancel(self, *, conversation_id: str, **kwargs) -> None:"));
    assert!(chat.contains("url = f\"{self._base_url}/v3/chat/{conversation_id}/cancel\""));
}
