use std::collections::HashMap;

use splitnet_domain::MemberId;

use crate::model::GroupSnapshot;

pub trait MemberDirectory: Send + Sync {
    fn display_name(&self, member_id: MemberId) -> Option<&str>;
}

impl MemberDirectory for HashMap<MemberId, String> {
    fn display_name(&self, member_id: MemberId) -> Option<&str> {
        self.get(&member_id).map(String::as_str)
    }
}

impl MemberDirectory for GroupSnapshot {
    fn display_name(&self, member_id: MemberId) -> Option<&str> {
        self.member(member_id).map(|member| member.name.as_str())
    }
}
