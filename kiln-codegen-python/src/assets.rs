//! Runtime support files shipped with every generated SDK.
//!
//! These are fixed text, resolved through the [`AssetSource`] capability so
//! the embedding mechanism stays swappable.

use kiln_core::StaticAssets;

/// The Python runtime files emitted next to the generated packages.
pub static RUNTIME_ASSETS: StaticAssets = StaticAssets::new(&[
    ("model.py", MODEL_PY),
    ("pagination.py", PAGINATION_PY),
    ("request.py", REQUEST_PY),
    ("stream.py", STREAM_PY),
    ("util.py", UTIL_PY),
]);

const MODEL_PY: &str = r#"from pydantic import BaseModel as PydanticBaseModel
from pydantic import ConfigDict


class BaseModel(PydanticBaseModel):
    model_config = ConfigDict(extra="allow")
"#;

const UTIL_PY: &str = r#"def remove_none_values(d):
    return {k: v for k, v in d.items() if v is not None}


def dump_exclude_none(d):
    out = {}
    for k, v in d.items():
        if v is None:
            continue
        if hasattr(v, "model_dump"):
            v = v.model_dump(exclude_none=True)
        out[k] = v
    return out
"#;

const PAGINATION_PY: &str = r#"from typing import Generic, List, Optional, TypeVar

T = TypeVar("T")


class TokenPagedResponse(Generic[T]):
    def get_items(self) -> List[T]:
        raise NotImplementedError

    def get_has_more(self) -> Optional[bool]:
        raise NotImplementedError

    def get_next_page_token(self) -> Optional[str]:
        raise NotImplementedError


class NumberPagedResponse(Generic[T]):
    def get_total(self) -> Optional[int]:
        raise NotImplementedError

    def get_has_more(self) -> Optional[bool]:
        raise NotImplementedError

    def get_items(self) -> List[T]:
        raise NotImplementedError


class LastIDPagedResponse(Generic[T]):
    def get_first_id(self) -> Optional[str]:
        raise NotImplementedError

    def get_last_id(self) -> Optional[str]:
        raise NotImplementedError

    def get_has_more(self) -> Optional[bool]:
        raise NotImplementedError

    def get_items(self) -> List[T]:
        raise NotImplementedError
"#;

const REQUEST_PY: &str = r#"from typing import Any, Optional

import httpx


class Requester:
    """Thin HTTP transport shared by every generated client."""

    def __init__(
        self,
        client: Optional[httpx.Client] = None,
        async_client: Optional[httpx.AsyncClient] = None,
    ):
        self._client = client or httpx.Client()
        self._async_client = async_client or httpx.AsyncClient()

    def request(
        self, method: str, url: str, stream: bool, cast: Any,
        headers=None, params=None, body=None, files=None,
    ):
        resp = self._client.request(
            method, url, headers=headers, params=params, json=body, files=files
        )
        resp.raise_for_status()
        if stream:
            return resp.iter_lines()
        return self._parse(resp, cast)

    async def arequest(
        self, method: str, url: str, stream: bool, cast: Any,
        headers=None, params=None, body=None, files=None,
    ):
        resp = await self._async_client.request(
            method, url, headers=headers, params=params, json=body, files=files
        )
        resp.raise_for_status()
        if stream:
            return resp.aiter_lines()
        return self._parse(resp, cast)

    def _parse(self, resp, cast):
        if not resp.content:
            return None
        payload = resp.json()
        data = payload.get("data", payload) if isinstance(payload, dict) else payload
        if cast is None:
            return data
        return cast.model_validate(data)
"#;

const STREAM_PY: &str = r#"from typing import Callable, List, Optional


class Stream:
    """Parses a line iterator into events restricted to an allow-list of fields."""

    def __init__(self, resp, fields: List[str], handler: Optional[Callable] = None):
        self._resp = resp
        self._fields = fields
        self._handler = handler

    def __iter__(self):
        event = {}
        for line in self._resp:
            if not line:
                if event:
                    yield self._emit(event)
                    event = {}
                continue
            key, _, value = line.partition(":")
            if key in self._fields:
                event[key] = value.strip()
        if event:
            yield self._emit(event)

    def _emit(self, event):
        if self._handler is not None:
            return self._handler(event)
        return event


class AsyncStream:
    def __init__(self, resp, fields: List[str], handler: Optional[Callable] = None):
        self._resp = resp
        self._fields = fields
        self._handler = handler

    def __aiter__(self):
        return self._iterate()

    async def _iterate(self):
        event = {}
        async for line in self._resp:
            if not line:
                if event:
                    yield self._emit(event)
                    event = {}
                continue
            key, _, value = line.partition(":")
            if key in self._fields:
                event[key] = value.strip()
        if event:
            yield self._emit(event)

    def _emit(self, event):
        if self._handler is not None:
            return self._handler(event)
        return event
"#;
