use splitnet_domain::{Expense, Member, MemberBalances, MemberId, Settlement};

/// Everything the host knows about one group at the time of a query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GroupSnapshot {
    pub members: Vec<Member>,
    pub expenses: Vec<Expense>,
}

impl GroupSnapshot {
    pub fn new(members: Vec<Member>, expenses: Vec<Expense>) -> Self {
        Self { members, expenses }
    }

    pub fn member_ids(&self) -> Vec<MemberId> {
        self.members.iter().map(|member| member.id).collect()
    }

    pub fn member(&self, id: MemberId) -> Option<&Member> {
        self.members.iter().find(|member| member.id == id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupSettlement {
    /// Net balance of every member; positive means the member is owed money.
    pub balances: MemberBalances,
    pub settlements: Vec<Settlement>,
    /// Balances left after paying `settlements`. All zero unless the
    /// minimum-transfer floor dropped something.
    pub residual: MemberBalances,
}

impl GroupSettlement {
    pub fn is_fully_settled(&self) -> bool {
        self.residual.values().all(|money| money.is_zero())
    }
}
