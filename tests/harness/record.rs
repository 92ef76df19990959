//! A hand-written schema fixture laid out the way flatc generates accessors.
//!
//! table Group { required_field: string (required); }
//! table Record { label: string (required); kind: int; reps: [long]; group: Group; }

use flatbuffers::{FlatBufferBuilder, ForwardsUOffset, VOffsetT, Vector, WIPOffset};
use serde::{Deserialize, Serialize};
use transflow::{Result, Schema};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub label: String,
    #[serde(rename = "type", default)]
    pub kind: i32,
    #[serde(default)]
    pub reps: Vec<i64>,
    #[serde(
        rename = "optionalgroup",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub group: Option<Group>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(rename = "requiredField")]
    pub required_field: String,
}

struct GroupTable<'a> {
    _tab: flatbuffers::Table<'a>,
}

impl<'a> flatbuffers::Follow<'a> for GroupTable<'a> {
    type Inner = GroupTable<'a>;

    #[inline]
    unsafe fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
        Self {
            _tab: flatbuffers::Table::new(buf, loc),
        }
    }
}

impl<'a> GroupTable<'a> {
    const VT_REQUIRED_FIELD: VOffsetT = 4;

    fn required_field(&self) -> Option<&'a str> {
        // Safety: the buffer was verified by `flatbuffers::root`.
        unsafe {
            self._tab
                .get::<ForwardsUOffset<&str>>(Self::VT_REQUIRED_FIELD, None)
        }
    }
}

impl flatbuffers::Verifiable for GroupTable<'_> {
    #[inline]
    fn run_verifier(
        v: &mut flatbuffers::Verifier,
        pos: usize,
    ) -> std::result::Result<(), flatbuffers::InvalidFlatbuffer> {
        v.visit_table(pos)?
            .visit_field::<ForwardsUOffset<&str>>("required_field", Self::VT_REQUIRED_FIELD, true)?
            .finish();
        Ok(())
    }
}

struct RecordTable<'a> {
    _tab: flatbuffers::Table<'a>,
}

impl<'a> flatbuffers::Follow<'a> for RecordTable<'a> {
    type Inner = RecordTable<'a>;

    #[inline]
    unsafe fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
        Self {
            _tab: flatbuffers::Table::new(buf, loc),
        }
    }
}

impl<'a> RecordTable<'a> {
    const VT_LABEL: VOffsetT = 4;
    const VT_KIND: VOffsetT = 6;
    const VT_REPS: VOffsetT = 8;
    const VT_GROUP: VOffsetT = 10;

    // Safety for all accessors: the buffer was verified by `flatbuffers::root`.

    fn label(&self) -> Option<&'a str> {
        unsafe { self._tab.get::<ForwardsUOffset<&str>>(Self::VT_LABEL, None) }
    }

    fn kind(&self) -> i32 {
        unsafe { self._tab.get::<i32>(Self::VT_KIND, Some(0)) }.unwrap_or(0)
    }

    fn reps(&self) -> Option<Vector<'a, i64>> {
        unsafe {
            self._tab
                .get::<ForwardsUOffset<Vector<'a, i64>>>(Self::VT_REPS, None)
        }
    }

    fn group(&self) -> Option<GroupTable<'a>> {
        unsafe {
            self._tab
                .get::<ForwardsUOffset<GroupTable<'a>>>(Self::VT_GROUP, None)
        }
    }
}

impl flatbuffers::Verifiable for RecordTable<'_> {
    #[inline]
    fn run_verifier(
        v: &mut flatbuffers::Verifier,
        pos: usize,
    ) -> std::result::Result<(), flatbuffers::InvalidFlatbuffer> {
        v.visit_table(pos)?
            .visit_field::<ForwardsUOffset<&str>>("label", Self::VT_LABEL, true)?
            .visit_field::<i32>("kind", Self::VT_KIND, false)?
            .visit_field::<ForwardsUOffset<Vector<'_, i64>>>("reps", Self::VT_REPS, false)?
            .visit_field::<ForwardsUOffset<GroupTable>>("group", Self::VT_GROUP, false)?
            .finish();
        Ok(())
    }
}

impl Schema for Record {
    fn encode<A: flatbuffers::Allocator>(&self, b: &mut FlatBufferBuilder<A>) -> Result<()> {
        let label = b.create_string(&self.label);
        let reps = b.create_vector(self.reps.as_slice());
        let group = self.group.as_ref().map(|g| {
            let field = b.create_string(&g.required_field);
            let start = b.start_table();
            b.push_slot_always::<WIPOffset<_>>(GroupTable::VT_REQUIRED_FIELD, field);
            let end = b.end_table(start);
            WIPOffset::<GroupTable>::new(end.value())
        });

        let start = b.start_table();
        b.push_slot_always::<WIPOffset<_>>(RecordTable::VT_LABEL, label);
        b.push_slot::<i32>(RecordTable::VT_KIND, self.kind, 0);
        b.push_slot_always::<WIPOffset<_>>(RecordTable::VT_REPS, reps);
        if let Some(group) = group {
            b.push_slot_always::<WIPOffset<_>>(RecordTable::VT_GROUP, group);
        }
        let end = b.end_table(start);
        b.finish(WIPOffset::<RecordTable>::new(end.value()), None);
        Ok(())
    }

    fn decode(payload: &[u8]) -> Result<Self> {
        let table = flatbuffers::root::<RecordTable>(payload)?;
        Ok(Record {
            label: table.label().unwrap_or_default().to_string(),
            kind: table.kind(),
            reps: table.reps().map(|v| v.iter().collect()).unwrap_or_default(),
            group: table.group().map(|g| Group {
                required_field: g.required_field().unwrap_or_default().to_string(),
            }),
        })
    }
}
